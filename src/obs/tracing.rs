// self
use crate::{_prelude::*, obs::FlowStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by engine operations.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided stage + call site.
	pub fn new(stage: FlowStage, call_site: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span =
				tracing::info_span!("oauth_handshake.flow", stage = stage.as_str(), call_site);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, call_site);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event inside the current span (no-op without the `tracing` feature).
pub fn trace_event(stage: FlowStage, message: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(stage = stage.as_str(), "{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, message);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn trace_event_runs_inside_instrumented_future() {
		let span = FlowSpan::new(FlowStage::RequestToken, "trace_event_runs_inside");
		let stage = span
			.instrument(async {
				trace_event(FlowStage::RequestToken, "request token issued");

				FlowStage::RequestToken
			})
			.await;

		assert_eq!(stage, FlowStage::RequestToken);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowStage::Refresh, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
