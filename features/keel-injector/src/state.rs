use std::fmt;

/// Lifecycle phase of a component
///
/// States are totally ordered and a component only ever moves forward.
/// `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum State {
    /// The instance exists, nothing has been injected yet
    Created,
    /// Fields gated on `Created`/`Initialized` are injected
    Initialized,
    Resolved,
    Started,
    /// Terminal, only reachable through [crate::Injector::stop]
    Stopped,
}

impl State {
    /// All states in lifecycle order
    pub const ALL: [State; 5] = [
        State::Created,
        State::Initialized,
        State::Resolved,
        State::Started,
        State::Stopped,
    ];

    /// Position of the state in [State::ALL]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Returns true if `self` is at least `other`
    pub fn is(self, other: State) -> bool {
        self >= other
    }

    /// The state following this one, `None` for [State::Stopped]
    pub fn next(self) -> Option<State> {
        let ordinal = self.ordinal();
        if ordinal < Self::ALL.len() - 1 {
            Some(Self::ALL[ordinal + 1])
        } else {
            None
        }
    }

    /// The state preceding this one, `None` for [State::Created]
    pub fn previous(self) -> Option<State> {
        self.ordinal().checked_sub(1).map(|ordinal| Self::ALL[ordinal])
    }

    pub fn name(self) -> &'static str {
        match self {
            State::Created => "CREATED",
            State::Initialized => "INITIALIZED",
            State::Resolved => "RESOLVED",
            State::Started => "STARTED",
            State::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
