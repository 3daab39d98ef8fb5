/// Fire-and-forget delivery of session announcements.
///
/// Implementations must return immediately: no retries, no delivery
/// confirmation, and a failing or slow endpoint must never stall the
/// caller. Dropped messages are acceptable.
pub trait SessionNotifier: Send + Sync {
    fn announce(&self, message: String);
}

/// Notifier that discards everything. Used when no endpoint is configured.
pub struct NullNotifier;

impl SessionNotifier for NullNotifier {
    fn announce(&self, _message: String) {}
}
