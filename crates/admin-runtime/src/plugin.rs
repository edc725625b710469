//! Plugin registration contract.

use admin_core::LifecycleBus;

/// A bundle of lifecycle handlers installed in one call.
///
/// ```rust,ignore
/// struct AuditPlugin;
///
/// impl AdminPlugin for AuditPlugin {
///     fn subscribe(&self, bus: &mut LifecycleBus) {
///         bus.subscribe(Phase::Start, |ctx, _| {
///             tracing::info!(repositories = ?ctx.registry().names(), "Starting");
///             Ok(())
///         });
///     }
/// }
/// ```
pub trait AdminPlugin {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Subscribes the plugin's handlers.
    fn subscribe(&self, bus: &mut LifecycleBus);
}
