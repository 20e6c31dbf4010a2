//! Page events and the host's response to them

/// Events a host adapter forwards to the page controllers
#[derive(Clone, Debug)]
pub enum PageEvent<N> {
    /// The document finished parsing (DOMContentLoaded)
    Ready,
    /// The page scrolled
    Scroll,
    /// The viewport was resized
    Resize,
    /// A previously requested animation frame is due
    AnimationFrame,
    /// A click landed on `target`
    Click {
        /// The innermost clicked node
        target: N,
    },
    /// A key was pressed
    KeyDown {
        /// The key event
        event: crate::input::KeyboardEvent,
        /// The node that had focus, if any
        target: Option<N>,
    },
}

/// What the host should do with the browser's default behaviour
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DefaultAction {
    /// Let the browser run its default action
    #[default]
    Allow,
    /// Call `preventDefault()` on the event
    Prevent,
}

impl DefaultAction {
    /// Combine two decisions; any `Prevent` wins
    pub fn merge(self, other: DefaultAction) -> DefaultAction {
        if self == DefaultAction::Prevent || other == DefaultAction::Prevent {
            DefaultAction::Prevent
        } else {
            DefaultAction::Allow
        }
    }
}

/// Side effects the controllers cannot perform synchronously
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Navigate the window to a URL
    Navigate(String),
    /// Resolve the device position and hand it to the location sender
    ShareLocation,
}

/// Result of dispatching one page event
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Response {
    /// Default-action decision for the originating event
    pub default_action: DefaultAction,
    /// Commands for the host to carry out
    pub commands: Vec<Command>,
}

impl Response {
    /// Response that prevents the default action
    pub fn prevent() -> Self {
        Self {
            default_action: DefaultAction::Prevent,
            commands: Vec::new(),
        }
    }

    /// Whether the host must call `preventDefault()`
    pub fn prevents_default(&self) -> bool {
        self.default_action == DefaultAction::Prevent
    }

    /// Record a default-action decision
    pub fn with_default(mut self, action: DefaultAction) -> Self {
        self.default_action = self.default_action.merge(action);
        self
    }

    /// Queue a command for the host
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_action_default() {
        assert_eq!(DefaultAction::default(), DefaultAction::Allow);
    }

    #[test]
    fn test_prevent_wins_merge() {
        assert_eq!(
            DefaultAction::Allow.merge(DefaultAction::Prevent),
            DefaultAction::Prevent
        );
        assert_eq!(
            DefaultAction::Allow.merge(DefaultAction::Allow),
            DefaultAction::Allow
        );
        let response = Response::prevent().with_default(DefaultAction::Allow);
        assert!(response.prevents_default());
    }
}
