//! DOM listener wiring and response application

use std::cell::RefCell;
use std::rc::Rc;

use storefront_core::{Site, SiteConfig};
use storefront_platform::{
    Command, Document, KeyboardEvent, PageEvent, PlatformError, Response, Result,
};
use tracing::{error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget};

use crate::host::WebHost;
use crate::input::convert_key;
use crate::logging;
use crate::share;

/// Id of the `<script type="application/json">` element carrying overrides
pub const CONFIG_ELEMENT_ID: &str = "storefront-config";

pub(crate) struct WebApp {
    pub(crate) site: Site<Element>,
    pub(crate) host: WebHost,
}

pub(crate) type SharedApp = Rc<RefCell<WebApp>>;

/// Build the site, install listeners, and run the ready pass
pub fn start() -> Result<()> {
    let host = WebHost::new()?;
    logging::init(host.body_data("log").as_deref());
    let config = load_config(host.document());
    let window = host.window().clone();
    let document = host.document().clone();

    let app: SharedApp = Rc::new(RefCell::new(WebApp {
        site: Site::new(config),
        host,
    }));
    install_frame_callback(&app);

    let scroll_app = app.clone();
    listen(&window, "scroll", move |_| {
        dispatch(&scroll_app, PageEvent::Scroll);
    })?;

    let resize_app = app.clone();
    listen(&window, "resize", move |_| {
        dispatch(&resize_app, PageEvent::Resize);
    })?;

    let click_app = app.clone();
    let click_document = document.clone();
    listen(&document, "click", move |event| {
        // Clicks on the document itself count as outside every dropdown
        let target = event_element(&event).or_else(|| click_document.document_element());
        if let Some(target) = target {
            let response = dispatch(&click_app, PageEvent::Click { target });
            apply(&click_app, &event, response);
        }
    })?;

    let key_app = app.clone();
    listen(&document, "keydown", move |event| {
        let Some(key_event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
            return;
        };
        let keyboard = KeyboardEvent::new(convert_key(&key_event.key()));
        let target = event_element(&event);
        let response = dispatch(
            &key_app,
            PageEvent::KeyDown {
                event: keyboard,
                target,
            },
        );
        apply(&key_app, &event, response);
    })?;

    if document.ready_state() == "loading" {
        let ready_app = app.clone();
        listen(&document, "DOMContentLoaded", move |_| {
            dispatch(&ready_app, PageEvent::Ready);
        })?;
    } else {
        dispatch(&app, PageEvent::Ready);
    }

    info!("storefront started");
    Ok(())
}

/// Read JSON overrides from the page, falling back to defaults
fn load_config(document: &web_sys::Document) -> SiteConfig {
    let Some(element) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
        return SiteConfig::default();
    };
    let source = element.text_content().unwrap_or_default();
    match SiteConfig::from_json_str(&source) {
        Ok(config) => config,
        Err(e) => {
            warn!("ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
            SiteConfig::default()
        }
    }
}

fn install_frame_callback(app: &SharedApp) {
    let weak = Rc::downgrade(app);
    let closure = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
        if let Some(app) = weak.upgrade() {
            dispatch(&app, PageEvent::AnimationFrame);
        }
    });
    let callback = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    closure.forget();
    app.borrow_mut().host.set_frame_callback(callback);
}

fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<()>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|_| PlatformError::Listener(event.to_string()))?;
    closure.forget();
    Ok(())
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

/// Run one event through the site; the borrow ends before returning
fn dispatch(app: &SharedApp, event: PageEvent<Element>) -> Response {
    let Ok(mut guard) = app.try_borrow_mut() else {
        warn!("re-entrant page event dropped");
        return Response::default();
    };
    let WebApp { site, host } = &mut *guard;
    site.dispatch(host, event)
}

fn apply(app: &SharedApp, event: &Event, response: Response) {
    if response.prevents_default() {
        event.prevent_default();
    }
    for command in response.commands {
        match command {
            Command::Navigate(url) => {
                let window = app.borrow().host.window().clone();
                if let Err(e) = window.location().set_href(&url) {
                    error!("navigation to {} failed: {:?}", url, e);
                }
            }
            Command::ShareLocation => share::request_location(app),
        }
    }
}
