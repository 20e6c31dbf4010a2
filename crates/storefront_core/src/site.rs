//! Page facade
//!
//! [`Site`] owns every controller on the page and is the single entry point a
//! host adapter drives. Each `on_*` method corresponds to one DOM listener;
//! [`Site::dispatch`] routes a [`PageEvent`] to the right one.
//!
//! Listener order matches the browser's: element listeners on the click
//! target run before the document-level ones the event bubbles to.

use std::fmt::Debug;

use storefront_platform::{Command, Host, Key, PageEvent, Response};
use tracing::{debug, info};

use crate::analytics;
use crate::config::SiteConfig;
use crate::dropdown::{DropdownController, DropdownSelectors};
use crate::layout_shift::{self, LogoDimensions};
use crate::location::{Coordinates, Delivery, LocationShare};
use crate::routing::LanguageRouter;
use crate::scroll_depth::ScrollDepthReporter;

/// Every controller of one page load
#[derive(Debug)]
pub struct Site<N> {
    config: SiteConfig,
    dropdowns: DropdownController<N>,
    scroll: ScrollDepthReporter,
    router: LanguageRouter,
    share: LocationShare,
    ready: bool,
}

impl<N: Clone + PartialEq + Debug> Default for Site<N> {
    fn default() -> Self {
        Self::new(SiteConfig::default())
    }
}

impl<N: Clone + PartialEq + Debug> Site<N> {
    pub fn new(config: SiteConfig) -> Self {
        Self {
            dropdowns: DropdownController::new(DropdownSelectors::from(&config.selectors)),
            scroll: ScrollDepthReporter::new(config.scroll_step),
            router: LanguageRouter::new(config.routing.clone()),
            share: LocationShare::new(config.contact.clone()),
            config,
            ready: false,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn dropdowns(&self) -> &DropdownController<N> {
        &self.dropdowns
    }

    pub fn scroll(&self) -> &ScrollDepthReporter {
        &self.scroll
    }

    pub fn router(&self) -> &LanguageRouter {
        &self.router
    }

    pub fn share(&self) -> &LocationShare {
        &self.share
    }

    /// Whether [`Site::on_ready`] has run
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Route one page event
    pub fn dispatch<H>(&mut self, host: &mut H, event: PageEvent<N>) -> Response
    where
        H: Host<Node = N> + ?Sized,
    {
        match event {
            PageEvent::Ready => {
                self.on_ready(host);
                Response::default()
            }
            PageEvent::Scroll => {
                self.on_scroll(host);
                Response::default()
            }
            PageEvent::Resize => {
                self.on_resize(host);
                Response::default()
            }
            PageEvent::AnimationFrame => {
                self.on_animation_frame(host);
                Response::default()
            }
            PageEvent::Click { target } => self.on_click(host, &target),
            PageEvent::KeyDown { event, target } => {
                self.on_key_down(host, &event.key, target.as_ref())
            }
        }
    }

    /// DOM ready: wire dropdowns, reserve logo space, take initial metrics.
    /// Runs once; later calls are ignored.
    pub fn on_ready<H>(&mut self, host: &mut H) -> Option<LogoDimensions>
    where
        H: Host<Node = N> + ?Sized,
    {
        if self.ready {
            return None;
        }
        self.ready = true;

        let wired = self.dropdowns.wire_all(host);
        let logo = layout_shift::reserve_logo_dimensions(
            host,
            &self.config.selectors.header_logo,
            self.config.fallback_logo,
        );
        self.scroll.on_resize(&*host);

        info!(host = host.name(), dropdowns = wired, "page ready");
        logo
    }

    pub fn on_scroll<H>(&mut self, host: &mut H)
    where
        H: Host<Node = N> + ?Sized,
    {
        self.scroll.on_scroll(host);
    }

    pub fn on_resize<H>(&mut self, host: &mut H)
    where
        H: Host<Node = N> + ?Sized,
    {
        self.scroll.on_resize(&*host);
    }

    /// Returns the scroll threshold reported in this frame, if any
    pub fn on_animation_frame<H>(&mut self, host: &mut H) -> Option<u32>
    where
        H: Host<Node = N> + ?Sized,
    {
        self.scroll.on_animation_frame(host)
    }

    /// A click landed on `target`
    pub fn on_click<H>(&mut self, host: &mut H, target: &N) -> Response
    where
        H: Host<Node = N> + ?Sized,
    {
        let selectors = &self.config.selectors;

        // Element listeners
        let mut response =
            Response::default().with_default(self.dropdowns.on_trigger_activate(host, target));

        if let Some(button) = host.closest(target, &selectors.language_button) {
            let language = host.attribute(&button, "data-lang").unwrap_or_default();
            let path = host.current_path();
            match self.router.resolve(&language, &path) {
                Some(page) => response.push(Command::Navigate(page.to_string())),
                None => debug!(language = %language, "language button without a destination"),
            }
            self.scroll.on_resize(&*host);
        }

        if let Some(cta) = host.closest(target, &selectors.cta) {
            let event = analytics::cta_click(&host.text_content(&cta));
            host.report(&event);
        }

        if host.closest(target, &selectors.location_lead).is_some() {
            host.report(&analytics::location_lead());
            response.push(Command::ShareLocation);
        }

        // Document listeners
        self.dropdowns.on_outside_click(host, target);

        response
    }

    /// A key was pressed while `target` had focus
    pub fn on_key_down<H>(&mut self, host: &mut H, key: &Key, target: Option<&N>) -> Response
    where
        H: Host<Node = N> + ?Sized,
    {
        let mut response = Response::default();
        if let Some(target) = target {
            response = response.with_default(self.dropdowns.on_trigger_key(host, target, key));
        }
        if *key == Key::Escape {
            self.dropdowns.on_escape(host);
        }
        response
    }

    /// Decide how to send a resolved position from this page
    pub fn location_delivery<H>(&self, host: &H, coords: Coordinates) -> Delivery
    where
        H: Host<Node = N> + ?Sized,
    {
        let location_name = host.body_data("location");
        self.share
            .plan(location_name.as_deref(), coords, &host.user_agent())
    }

    /// Message shown when the position cannot be resolved
    pub fn location_fallback(&self) -> &str {
        self.share.fallback_message()
    }
}
