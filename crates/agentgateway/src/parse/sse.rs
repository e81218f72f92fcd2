//! Line-oriented SSE scanning and the two framing shapes the translation core speaks: canonical
//! `data: <json>\n\n` / `data: [DONE]\n\n` frames coming from the backend, and foreign
//! `event: <name>\ndata: <json>\n\n` frames going out to the client.
//!
//! The scanner buffers raw bytes, starting at a 64 KiB capacity and growing as needed, and bails
//! with [`StreamError::LineTooLong`] if a single line exceeds 1 MiB rather than growing without
//! bound on a misbehaving or malicious backend.

use bytes::{Bytes, BytesMut};
use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::StreamError;

const INITIAL_BUFFER: usize = 64 * 1024;
const MAX_LINE: usize = 1024 * 1024;

/// One parsed `field: value` block, terminated by a blank line, as defined by the SSE wire
/// format. Only the two fields this crate ever emits or consumes are tracked.
#[derive(Debug, Default, Clone)]
pub struct RawEvent {
	pub event: Option<String>,
	pub data: String,
}

/// Scans a raw byte stream into [`RawEvent`] blocks. Used for the canonical (data-only) body
/// coming from the backend; also works for any well-formed SSE body in general.
pub fn scan_events<S, E>(body: S) -> impl Stream<Item = Result<RawEvent, StreamError>>
where
	S: Stream<Item = Result<Bytes, E>>,
	E: Into<StreamError>,
{
	async_stream::stream! {
		let mut body = std::pin::pin!(body);
		let mut buf = BytesMut::with_capacity(INITIAL_BUFFER);
		let mut cur = RawEvent::default();
		let mut have_data = false;

		'outer: loop {
			// Drain any complete lines already sitting in `buf` before asking for more bytes.
			loop {
				let Some(pos) = buf.iter().position(|&b| b == b'\n') else {
					if buf.len() > MAX_LINE {
						yield Err(StreamError::LineTooLong { limit: MAX_LINE });
						return;
					}
					break;
				};
				let mut line = buf.split_to(pos + 1);
				line.truncate(line.len() - 1);
				if line.last() == Some(&b'\r') {
					line.truncate(line.len() - 1);
				}
				let line = String::from_utf8_lossy(&line).into_owned();

				if line.is_empty() {
					if have_data {
						yield Ok(std::mem::take(&mut cur));
						have_data = false;
					}
					continue;
				}
				if let Some(rest) = line.strip_prefix("event:") {
					cur.event = Some(rest.trim_start().to_string());
				} else if let Some(rest) = line.strip_prefix("data:") {
					if have_data {
						cur.data.push('\n');
					}
					cur.data.push_str(rest.trim_start());
					have_data = true;
				}
				// Unrecognised fields (id:, retry:, comments) are intentionally ignored.
			}

			match body.next().await {
				Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
				Some(Err(e)) => {
					yield Err(e.into());
					return;
				}
				None => {
					if have_data {
						yield Ok(std::mem::take(&mut cur));
					}
					break 'outer;
				}
			}
		}
	}
}

/// The terminal `[DONE]` sentinel canonical streams use in place of one more JSON object.
const DONE_SENTINEL: &str = "[DONE]";

/// What the per-frame callback in [`json_transform_multi`] receives for each canonical SSE
/// block: either a parsed (or unparseable) JSON payload, or the `[DONE]` sentinel.
pub enum JsonFrame<T> {
	Data(Result<T, serde_json::Error>),
	Done,
}

/// Re-frames a canonical (data-only) backend stream into zero or more named foreign SSE events
/// per input frame. `f` runs once per canonical frame (including the terminal `[DONE]`) and
/// returns the `(event_name, payload)` pairs to emit; most frames map to exactly one event, but
/// e.g. a canonical chunk carrying both a text delta and a finish reason can expand to two.
///
/// Malformed canonical JSON is handed to `f` as `JsonFrame::Data(Err(_))` rather than aborting
/// the stream: a single bad chunk is logged and skipped, not fatal.
pub fn json_transform_multi<In, Out, F, S, E>(
	body: S,
	cancellation: CancellationToken,
	mut f: F,
) -> impl Stream<Item = Result<Bytes, StreamError>>
where
	In: serde::de::DeserializeOwned,
	Out: serde::Serialize,
	F: FnMut(JsonFrame<In>) -> Vec<(&'static str, Out)>,
	S: Stream<Item = Result<Bytes, E>>,
	E: Into<StreamError>,
{
	async_stream::stream! {
		let events = scan_events(body);
		let mut events = std::pin::pin!(events);

		loop {
			if cancellation.is_cancelled() {
				yield Err(StreamError::Cancelled);
				return;
			}
			let Some(event) = events.next().await else { return };
			let raw = match event {
				Ok(raw) => raw,
				Err(e) => {
					yield Err(e);
					return;
				}
			};

			let frame = if raw.data.trim() == DONE_SENTINEL {
				JsonFrame::Done
			} else {
				JsonFrame::Data(serde_json::from_str::<In>(&raw.data))
			};

			for (name, payload) in f(frame) {
				match encode_named_frame(name, &payload) {
					Ok(bytes) => yield Ok(bytes),
					Err(_) => continue,
				}
			}
		}
	}
}

fn encode_named_frame<Out: serde::Serialize>(
	name: &'static str,
	payload: &Out,
) -> Result<Bytes, serde_json::Error> {
	let json = serde_json::to_string(payload)?;
	Ok(Bytes::from(format!("event: {name}\ndata: {json}\n\n")))
}
