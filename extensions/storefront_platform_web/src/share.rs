//! Geolocation lookup and SMS/clipboard delivery

use js_sys::{Function, Object, Promise, Reflect};
use storefront_core::{Coordinates, Delivery, GeolocationOptions};
use storefront_platform::{PlatformError, Result};
use tracing::{info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};

use crate::app::SharedApp;

/// Ask the browser for a position and deliver it
pub(crate) fn request_location(app: &SharedApp) {
    let (window, options, fallback) = {
        let app = app.borrow();
        (
            app.host.window().clone(),
            app.site.share().options(),
            app.site.location_fallback().to_string(),
        )
    };

    let success_app = app.clone();
    let success_window = window.clone();
    let success_fallback = fallback.clone();
    let on_success = Closure::once_into_js(move |position: JsValue| {
        let Some(coords) = read_coordinates(&position) else {
            alert(&success_window, &success_fallback);
            return;
        };
        let delivery = {
            let app = success_app.borrow();
            app.site.location_delivery(&app.host, coords)
        };
        deliver(&success_window, delivery);
    });

    let error_window = window.clone();
    let error_fallback = fallback.clone();
    let on_error = Closure::once_into_js(move |_error: JsValue| {
        warn!("geolocation failed");
        alert(&error_window, &error_fallback);
    });

    if let Err(e) = get_current_position(&window, &on_success, &on_error, options) {
        warn!("geolocation unavailable: {}", e);
        alert(&window, &fallback);
    }
}

fn get_current_position(
    window: &web_sys::Window,
    on_success: &JsValue,
    on_error: &JsValue,
    options: GeolocationOptions,
) -> Result<()> {
    let geolocation = property(window.navigator().as_ref(), "geolocation")?;
    let get_position = property(&geolocation, "getCurrentPosition")?
        .dyn_into::<Function>()
        .map_err(|_| PlatformError::Unsupported("getCurrentPosition".to_string()))?;

    let js_options = Object::new();
    let high_accuracy = JsValue::from_bool(options.enable_high_accuracy);
    set(&js_options, "enableHighAccuracy", high_accuracy)?;
    let timeout_ms = options.timeout.as_millis() as f64;
    set(&js_options, "timeout", JsValue::from_f64(timeout_ms))?;
    let maximum_age_ms = options.maximum_age.as_millis() as f64;
    set(&js_options, "maximumAge", JsValue::from_f64(maximum_age_ms))?;

    get_position
        .call3(&geolocation, on_success, on_error, &js_options)
        .map_err(|e| PlatformError::Call(format!("{:?}", e)))?;
    Ok(())
}

/// `position.coords.{latitude,longitude}`
fn read_coordinates(position: &JsValue) -> Option<Coordinates> {
    let coords = property(position, "coords").ok()?;
    let latitude = property(&coords, "latitude").ok()?.as_f64()?;
    let longitude = property(&coords, "longitude").ok()?.as_f64()?;
    Some(Coordinates::new(latitude, longitude))
}

fn deliver(window: &web_sys::Window, delivery: Delivery) {
    match delivery {
        Delivery::Sms { url } => {
            info!("opening sms composer");
            if let Err(e) = window.location().set_href(&url) {
                warn!("sms navigation failed: {:?}", e);
            }
        }
        Delivery::Clipboard {
            message,
            confirmation,
        } => {
            if let Err(e) = copy_to_clipboard(window, message.clone(), confirmation) {
                warn!("clipboard unavailable: {}", e);
                alert(window, &message);
            }
        }
    }
}

fn copy_to_clipboard(
    window: &web_sys::Window,
    message: String,
    confirmation: String,
) -> Result<()> {
    let clipboard = property(window.navigator().as_ref(), "clipboard")?;
    let write_text = property(&clipboard, "writeText")?
        .dyn_into::<Function>()
        .map_err(|_| PlatformError::Unsupported("clipboard.writeText".to_string()))?;
    let promise = write_text
        .call1(&clipboard, &JsValue::from_str(&message))
        .map_err(|e| PlatformError::Call(format!("{:?}", e)))?
        .dyn_into::<Promise>()
        .map_err(|_| PlatformError::Call("writeText did not return a promise".to_string()))?;

    let ok_window = window.clone();
    let on_copied = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
        alert(&ok_window, &confirmation);
    });
    let err_window = window.clone();
    let on_refused = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
        // Let the visitor copy it by hand
        alert(&err_window, &message);
    });
    let _ = promise.then2(&on_copied, &on_refused);
    on_copied.forget();
    on_refused.forget();
    Ok(())
}

fn property(target: &JsValue, name: &str) -> Result<JsValue> {
    let value = Reflect::get(target, &JsValue::from_str(name))
        .map_err(|_| PlatformError::Unsupported(name.to_string()))?;
    if value.is_undefined() || value.is_null() {
        return Err(PlatformError::Unsupported(name.to_string()));
    }
    Ok(value)
}

fn set(target: &Object, name: &str, value: JsValue) -> Result<()> {
    Reflect::set(target, &JsValue::from_str(name), &value)
        .map_err(|e| PlatformError::Call(format!("{:?}", e)))?;
    Ok(())
}

fn alert(window: &web_sys::Window, message: &str) {
    if window.alert_with_message(message).is_err() {
        warn!("alert suppressed");
    }
}
