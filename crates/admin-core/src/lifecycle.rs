//! Lifecycle event bus.
//!
//! Bootstrap is a fixed sequence of [`Phase`]s. Plugins and the host subscribe
//! handlers per phase; the orchestrator publishes the phases in order. Within
//! a phase handlers run synchronously in subscription order, so a handler can
//! rely on every earlier handler of that phase having completed.
//!
//! ```text
//! set-config ──► start:after ──► start:init-plugin ──► start ──► start:before
//! ```
//!
//! A failing handler aborts the rest of its phase and the error is handed back
//! to the publisher untouched. There is no isolation between handlers.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::{debug, trace};

use crate::context::AdminContext;
use crate::error::{BoxError, LifecycleError, LifecycleResult};

// =============================================================================
// Phase
// =============================================================================

/// A named point in the bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Configuration was parsed; carries the configuration as [`PhaseArgs::Config`].
    SetConfig,
    /// First start phase.
    StartAfter,
    /// Plugins register field types and other extensions.
    StartInitPlugin,
    /// The request handler is built and stored under `App/instance`.
    Start,
    /// Last start phase.
    StartBefore,
}

impl Phase {
    /// Start phases in publish order.
    ///
    /// The names read inverted (`start:after` fires first); the order is kept
    /// as-is for compatibility with existing plugins.
    pub const START_SEQUENCE: [Phase; 4] = [
        Phase::StartAfter,
        Phase::StartInitPlugin,
        Phase::Start,
        Phase::StartBefore,
    ];

    /// Returns the wire name of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SetConfig => "set-config",
            Self::StartAfter => "start:after",
            Self::StartInitPlugin => "start:init-plugin",
            Self::Start => "start",
            Self::StartBefore => "start:before",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set-config" => Ok(Self::SetConfig),
            "start:after" => Ok(Self::StartAfter),
            "start:init-plugin" => Ok(Self::StartInitPlugin),
            "start" => Ok(Self::Start),
            "start:before" => Ok(Self::StartBefore),
            other => Err(format!("unknown lifecycle phase '{other}'")),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Arguments published alongside a phase.
#[derive(Debug, Clone, Copy)]
pub enum PhaseArgs<'a> {
    /// No payload.
    None,
    /// The parsed configuration, as a plain mapping.
    Config(&'a Value),
}

impl<'a> PhaseArgs<'a> {
    /// Returns the configuration payload, if any.
    pub fn config(&self) -> Option<&'a Value> {
        match self {
            Self::Config(value) => Some(value),
            Self::None => None,
        }
    }
}

/// A subscribed phase handler.
pub type PhaseHandler =
    Box<dyn FnMut(&mut AdminContext, &PhaseArgs<'_>) -> Result<(), BoxError> + Send>;

// =============================================================================
// LifecycleBus
// =============================================================================

/// Synchronous publish/subscribe channel keyed by [`Phase`].
#[derive(Default)]
pub struct LifecycleBus {
    handlers: HashMap<Phase, Vec<PhaseHandler>>,
}

impl LifecycleBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the handler list of `phase`.
    pub fn subscribe<F>(&mut self, phase: Phase, handler: F)
    where
        F: FnMut(&mut AdminContext, &PhaseArgs<'_>) -> Result<(), BoxError> + Send + 'static,
    {
        let list = self.handlers.entry(phase).or_default();
        list.push(Box::new(handler));
        trace!(phase = %phase, position = list.len(), "Handler subscribed");
    }

    /// Invokes every handler of `phase` in subscription order.
    ///
    /// Stops at the first failing handler and returns its error.
    pub fn publish(
        &mut self,
        phase: Phase,
        ctx: &mut AdminContext,
        args: &PhaseArgs<'_>,
    ) -> LifecycleResult<()> {
        let Some(handlers) = self.handlers.get_mut(&phase) else {
            debug!(phase = %phase, "No handlers subscribed");
            return Ok(());
        };

        debug!(phase = %phase, handlers = handlers.len(), "Publishing phase");
        for (index, handler) in handlers.iter_mut().enumerate() {
            handler(ctx, args).map_err(|source| LifecycleError::Handler {
                phase,
                index,
                source,
            })?;
        }
        Ok(())
    }

    /// Returns the number of handlers subscribed to `phase`.
    pub fn handler_count(&self, phase: Phase) -> usize {
        self.handlers.get(&phase).map_or(0, Vec::len)
    }

    /// Returns `true` if no handler is subscribed to any phase.
    pub fn is_empty(&self) -> bool {
        self.handlers.values().all(Vec::is_empty)
    }
}

impl fmt::Debug for LifecycleBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .handlers
            .iter()
            .map(|(phase, list)| (phase.as_str(), list.len()))
            .collect();
        f.debug_struct("LifecycleBus")
            .field("handlers", &counts)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &str) -> PhaseHandler {
        let log = Arc::clone(log);
        let label = label.to_string();
        Box::new(move |_ctx, _args| {
            log.lock().unwrap().push(label.clone());
            Ok(())
        })
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = LifecycleBus::new();
        bus.subscribe(Phase::Start, recorder(&log, "h1"));
        bus.subscribe(Phase::Start, recorder(&log, "h2"));
        bus.subscribe(Phase::StartBefore, recorder(&log, "other"));

        let mut ctx = AdminContext::new();
        bus.publish(Phase::Start, &mut ctx, &PhaseArgs::None).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["h1", "h2"]);
    }

    #[test]
    fn test_later_handler_sees_earlier_writes() {
        let mut bus = LifecycleBus::new();
        bus.subscribe(Phase::Start, |ctx, _| {
            ctx.registry_mut().repository_mut("App").set("step", 1_u32);
            Ok(())
        });
        bus.subscribe(Phase::Start, |ctx, _| {
            let step = ctx.registry().repository("App")?.require::<u32>("step")?;
            ctx.registry_mut().repository_mut("App").set("step", *step + 1);
            Ok(())
        });

        let mut ctx = AdminContext::new();
        bus.publish(Phase::Start, &mut ctx, &PhaseArgs::None).unwrap();

        let step = ctx.registry().repository("App").unwrap().get::<u32>("step");
        assert_eq!(step.as_deref(), Some(&2));
    }

    #[test]
    fn test_failing_handler_aborts_phase() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = LifecycleBus::new();
        bus.subscribe(Phase::SetConfig, recorder(&log, "first"));
        bus.subscribe(Phase::SetConfig, |_ctx, _args| Err("boom".into()));
        bus.subscribe(Phase::SetConfig, recorder(&log, "never"));

        let mut ctx = AdminContext::new();
        let err = bus
            .publish(Phase::SetConfig, &mut ctx, &PhaseArgs::None)
            .unwrap_err();

        let LifecycleError::Handler { phase, index, .. } = err;
        assert_eq!(phase, Phase::SetConfig);
        assert_eq!(index, 1);
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
    }

    #[test]
    fn test_config_payload_reaches_handler() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let mut bus = LifecycleBus::new();
        bus.subscribe(Phase::SetConfig, move |_ctx, args| {
            *sink.lock().unwrap() = args.config().cloned();
            Ok(())
        });

        let config = serde_json::json!({ "locals": { "site": "demo" } });
        let mut ctx = AdminContext::new();
        bus.publish(Phase::SetConfig, &mut ctx, &PhaseArgs::Config(&config))
            .unwrap();

        assert_eq!(seen.lock().unwrap().as_ref(), Some(&config));
    }

    #[test]
    fn test_phase_names_round_trip() {
        for phase in [Phase::SetConfig]
            .into_iter()
            .chain(Phase::START_SEQUENCE)
        {
            assert_eq!(phase.as_str().parse::<Phase>(), Ok(phase));
        }
        assert!("start:later".parse::<Phase>().is_err());
    }

    #[test]
    fn test_handler_count() {
        let mut bus = LifecycleBus::new();
        assert!(bus.is_empty());
        bus.subscribe(Phase::Start, |_, _| Ok(()));
        assert_eq!(bus.handler_count(Phase::Start), 1);
        assert_eq!(bus.handler_count(Phase::StartAfter), 0);
    }
}
