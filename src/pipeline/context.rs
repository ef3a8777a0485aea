//! Per-call context handed to every module's `process`.

/// Context for one `process` call. Carries the host's optional logger
/// sink — a freeform string channel with no structured schema. Calling
/// it is optional for modules and has no effect on control flow.
pub struct ProcessContext<'a> {
    log: Option<&'a mut dyn FnMut(&str)>,
}

impl<'a> ProcessContext<'a> {
    /// A context with no logger attached.
    pub fn silent() -> Self {
        ProcessContext { log: None }
    }

    /// A context forwarding progress strings to `sink`.
    pub fn with_logger(sink: &'a mut dyn FnMut(&str)) -> Self {
        ProcessContext { log: Some(sink) }
    }

    /// Emit a progress message, if a sink is attached.
    pub fn log(&mut self, msg: &str) {
        if let Some(sink) = self.log.as_mut() {
            sink(msg);
        }
    }

    /// Reborrow for passing down into nested calls.
    pub fn reborrow(&mut self) -> ProcessContext<'_> {
        match self.log.as_mut() {
            Some(sink) => ProcessContext { log: Some(&mut **sink) },
            None => ProcessContext { log: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_collects_messages() {
        let mut lines = Vec::new();
        let mut sink = |msg: &str| lines.push(msg.to_string());
        let mut ctx = ProcessContext::with_logger(&mut sink);
        ctx.log("one");
        ctx.reborrow().log("two");
        drop(ctx);
        assert_eq!(lines, vec!["one", "two"]);
    }

    #[test]
    fn test_silent_context_is_a_noop() {
        let mut ctx = ProcessContext::silent();
        ctx.log("ignored");
    }
}
