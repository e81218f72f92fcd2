//! Streaming transformation: the hardest component. Re-frames the canonical (data-only) SSE
//! stream into the foreign (named-event) SSE stream while maintaining the content-block lifecycle
//! state machine (`start -> deltas* -> stop`) and the tool-index -> block-index bookkeeping.
//!
//! Grounded on the `translate_stream`/`StreamState`/`BlockState`/`PendingToolCall` state machine
//! in `other_examples/0f675b69` and the surrounding `json_transform_multi` calling convention in
//! `other_examples/5a48c5cb`'s `translate_stream`/`passthrough_stream` pair. `parse::sse` supplies
//! the scanner and cancellation check; this module owns only the event re-framing logic.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::ids::new_message_id;
use crate::llm::ByteStream;
use crate::llm::conversion::response::stop_reason as map_stop_reason;
use crate::llm::types::{canonical, foreign};
use crate::parse::sse::{JsonFrame, json_transform_multi};

type Events = Vec<(&'static str, foreign::StreamEvent)>;

#[derive(Debug)]
enum BlockState {
	Text { index: usize },
	ToolUse { index: usize, tool_index: u32 },
}

/// Accumulated state for one in-flight tool call: `id`/`name` arrive once (first chunk),
/// `arguments` arrives as a sequence of fragments to buffer and re-emit verbatim.
#[derive(Debug, Default)]
struct ToolCallState {
	id: Option<String>,
	name: Option<String>,
	arguments: String,
}

#[derive(Debug)]
struct StreamState {
	message_id: String,
	model: Option<String>,
	message_start_sent: bool,
	message_stop_sent: bool,
	next_block_index: usize,
	current_block: Option<BlockState>,
	/// Canonical tool_call index -> foreign content-block index. Populated the moment a tool
	/// block is *first* opened, in emission order, which need not match the numeric order of
	/// canonical indices.
	tool_block_indices: HashMap<u32, usize>,
	tool_calls: HashMap<u32, ToolCallState>,
	pending_stop_reason: Option<foreign::StopReason>,
	pending_usage: Option<foreign::MessageDeltaUsage>,
}

impl StreamState {
	fn new() -> Self {
		StreamState {
			message_id: new_message_id(),
			model: None,
			message_start_sent: false,
			message_stop_sent: false,
			next_block_index: 0,
			current_block: None,
			tool_block_indices: HashMap::new(),
			tool_calls: HashMap::new(),
			pending_stop_reason: None,
			pending_usage: None,
		}
	}

	fn ensure_message_start(&mut self, model: Option<&str>, events: &mut Events) {
		if self.message_start_sent {
			return;
		}
		self.message_start_sent = true;
		if let Some(model) = model.filter(|m| !m.is_empty()) {
			self.model = Some(model.to_string());
		}
		let response = foreign::Response::new(
			self.message_id.clone(),
			self.model.clone().unwrap_or_else(|| "unknown".to_string()),
		);
		events.push(("message_start", foreign::StreamEvent::MessageStart {
			message: response,
		}));
	}

	fn close_current_block(&mut self, events: &mut Events) {
		if let Some(block) = self.current_block.take() {
			let index = match block {
				BlockState::Text { index } | BlockState::ToolUse { index, .. } => index,
			};
			events.push(("content_block_stop", foreign::StreamEvent::ContentBlockStop {
				index,
			}));
		}
	}

	fn open_text_block(&mut self, events: &mut Events) -> usize {
		if let Some(BlockState::Text { index }) = self.current_block {
			return index;
		}
		self.close_current_block(events);
		let index = self.next_block_index;
		self.next_block_index += 1;
		self.current_block = Some(BlockState::Text { index });
		events.push(("content_block_start", foreign::StreamEvent::ContentBlockStart {
			index,
			content_block: foreign::StreamBlockOpen::Text {
				text: String::new(),
			},
		}));
		index
	}

	/// Opens a brand-new tool_use block (`tool_index` has never been seen before). Only called
	/// once `id` and `name` are both known: a tool delta missing either at block-open time must
	/// not open a block.
	fn open_tool_block(
		&mut self,
		tool_index: u32,
		id: String,
		name: String,
		events: &mut Events,
	) -> usize {
		self.close_current_block(events);
		let index = self.next_block_index;
		self.next_block_index += 1;
		self.tool_block_indices.insert(tool_index, index);
		self.current_block = Some(BlockState::ToolUse { index, tool_index });
		events.push(("content_block_start", foreign::StreamEvent::ContentBlockStart {
			index,
			content_block: foreign::StreamBlockOpen::ToolUse { id, name },
		}));
		index
	}

	/// Makes an already-opened tool block the current one again (closing whatever else is open),
	/// without re-emitting `content_block_start`.
	fn resume_tool_block(&mut self, tool_index: u32, events: &mut Events) -> usize {
		if let Some(BlockState::ToolUse {
			index,
			tool_index: current,
		}) = &self.current_block
			&& *current == tool_index
		{
			return *index;
		}
		self.close_current_block(events);
		let index = *self
			.tool_block_indices
			.get(&tool_index)
			.expect("resume_tool_block called only once the block is open");
		self.current_block = Some(BlockState::ToolUse { index, tool_index });
		index
	}

	fn handle_text_delta(&mut self, text: String, events: &mut Events) {
		let index = self.open_text_block(events);
		events.push(("content_block_delta", foreign::StreamEvent::ContentBlockDelta {
			index,
			delta: foreign::ContentBlockDelta::TextDelta { text },
		}));
	}

	fn handle_tool_call_chunk(&mut self, chunk: canonical::ToolCallChunk, events: &mut Events) {
		let tool_index = chunk.index;
		let entry = self.tool_calls.entry(tool_index).or_default();
		if let Some(id) = chunk.id {
			entry.id = Some(id);
		}
		let mut fragment = None;
		if let Some(function) = chunk.function {
			if let Some(name) = function.name {
				entry.name = Some(name);
			}
			if let Some(args) = function.arguments
				&& !args.is_empty()
			{
				entry.arguments.push_str(&args);
				fragment = Some(args);
			}
		}

		let already_open = self.tool_block_indices.contains_key(&tool_index);
		let index = if already_open {
			self.resume_tool_block(tool_index, events)
		} else {
			let entry = &self.tool_calls[&tool_index];
			let (Some(id), Some(name)) = (entry.id.clone(), entry.name.clone()) else {
				return;
			};
			self.open_tool_block(tool_index, id, name, events)
		};

		if let Some(fragment) = fragment {
			events.push(("content_block_delta", foreign::StreamEvent::ContentBlockDelta {
				index,
				delta: foreign::ContentBlockDelta::InputJsonDelta {
					partial_json: fragment,
				},
			}));
		}
	}

	fn finalize(&mut self, events: &mut Events) {
		if self.message_stop_sent {
			return;
		}
		self.ensure_message_start(None, events);
		self.close_current_block(events);
		let stop_reason = self
			.pending_stop_reason
			.take()
			.unwrap_or(foreign::StopReason::EndTurn);
		let usage = self.pending_usage.take().unwrap_or_default();
		events.push(("message_delta", foreign::StreamEvent::MessageDelta {
			delta: foreign::MessageDelta {
				stop_reason: Some(stop_reason),
				stop_sequence: None,
			},
			usage,
		}));
		events.push(("message_stop", foreign::StreamEvent::MessageStop));
		self.message_stop_sent = true;
	}
}

/// Converts the canonical SSE `ByteStream` into the foreign SSE `ByteStream`. Cancellation is
/// checked once per canonical frame by `json_transform_multi`; recoverable local errors
/// (malformed JSON) are logged and skipped rather than ending the stream.
pub fn translate_stream(canonical: ByteStream, cancellation: CancellationToken) -> ByteStream {
	let mut state = StreamState::new();
	Box::pin(json_transform_multi::<
		canonical::StreamResponse,
		foreign::StreamEvent,
		_,
		_,
		_,
	>(canonical, cancellation, move |frame| {
		let mut events = Events::new();
		match frame {
			JsonFrame::Done => state.finalize(&mut events),
			JsonFrame::Data(Err(e)) => {
				warn!("failed to parse canonical stream chunk during translation: {e}");
			},
			JsonFrame::Data(Ok(chunk)) => {
				state.ensure_message_start(Some(chunk.model.as_str()), &mut events);

				if let Some(usage) = chunk.usage {
					state.pending_usage = Some(foreign::MessageDeltaUsage {
						input_tokens: usage.prompt_tokens,
						output_tokens: usage.completion_tokens,
					});
				}

				if let Some(choice) = chunk.choices.into_iter().next() {
					if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
						state.handle_text_delta(text, &mut events);
					}
					if let Some(tool_calls) = choice.delta.tool_calls {
						for tc in tool_calls {
							state.handle_tool_call_chunk(tc, &mut events);
						}
					}
					if let Some(reason) = choice.finish_reason.as_deref() {
						state.pending_stop_reason = Some(map_stop_reason(Some(reason)));
					}
				}
			},
		}
		events
	}))
}

#[cfg(test)]
mod tests {
	use futures_util::StreamExt;
	use futures_util::stream;

	use super::*;
	use crate::error::StreamError;

	fn canonical_frames(frames: &[&str]) -> ByteStream {
		let owned: Vec<Result<bytes::Bytes, StreamError>> = frames
			.iter()
			.map(|f| Ok(bytes::Bytes::from(format!("data: {f}\n\n"))))
			.collect();
		Box::pin(stream::iter(owned))
	}

	async fn run(frames: &[&str]) -> Vec<(String, serde_json::Value)> {
		let out = translate_stream(canonical_frames(frames), CancellationToken::new());
		let bytes: Vec<_> = out.collect().await;
		bytes
			.into_iter()
			.map(|b| {
				let text = String::from_utf8(b.unwrap().to_vec()).unwrap();
				let mut lines = text.splitn(2, '\n');
				let event = lines
					.next()
					.unwrap()
					.strip_prefix("event: ")
					.unwrap()
					.to_string();
				let data = lines.next().unwrap().strip_prefix("data: ").unwrap();
				let data = data.trim_end_matches('\n');
				(event, serde_json::from_str(data).unwrap())
			})
			.collect()
	}

	#[tokio::test]
	async fn simple_text_stream_emits_full_lifecycle() {
		let events = run(&[
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"content":"Hi"}}]}"#,
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{},"finish_reason":"stop"}],"usage":{"prompt_tokens":1,"completion_tokens":1}}"#,
			"[DONE]",
		])
		.await;
		let names: Vec<_> = events.iter().map(|(n, _)| n.as_str()).collect();
		assert_eq!(
			names,
			vec![
				"message_start",
				"content_block_start",
				"content_block_delta",
				"content_block_stop",
				"message_delta",
				"message_stop",
			]
		);
		assert_eq!(events[4].1["delta"]["stop_reason"], "end_turn");
		assert_eq!(events[4].1["usage"]["input_tokens"], 1);
	}

	#[tokio::test]
	async fn streaming_tool_call_across_chunks_emits_one_block_and_verbatim_fragments() {
		let events = run(&[
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"c1","function":{"name":"get_weather"}}]}}]}"#,
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{"}}]}}]}"#,
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"\"x\":"}}]}}]}"#,
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"1}"}}]}}]}"#,
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{},"finish_reason":"tool_calls"}]}"#,
			"[DONE]",
		])
		.await;
		let names: Vec<_> = events.iter().map(|(n, _)| n.as_str()).collect();
		assert_eq!(
			names,
			vec![
				"message_start",
				"content_block_start",
				"content_block_delta",
				"content_block_delta",
				"content_block_delta",
				"content_block_stop",
				"message_delta",
				"message_stop",
			]
		);
		assert_eq!(events[1].1["content_block"]["type"], "tool_use");
		assert_eq!(events[1].1["content_block"]["id"], "c1");
		assert_eq!(events[1].1["content_block"]["name"], "get_weather");
		assert_eq!(events[2].1["delta"]["partial_json"], "{");
		assert_eq!(events[3].1["delta"]["partial_json"], "\"x\":");
		assert_eq!(events[4].1["delta"]["partial_json"], "1}");
		assert_eq!(events[6].1["delta"]["stop_reason"], "tool_use");
	}

	#[tokio::test]
	async fn tool_call_missing_id_and_name_does_not_open_a_block() {
		let events = run(&[
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"function":{"arguments":"{}"}}]}}]}"#,
			"[DONE]",
		])
		.await;
		let names: Vec<_> = events.iter().map(|(n, _)| n.as_str()).collect();
		assert!(!names.contains(&"content_block_start"));
		assert!(!names.contains(&"content_block_stop"));
	}

	#[tokio::test]
	async fn malformed_line_between_well_formed_ones_does_not_abort() {
		let events = run(&[
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"content":"A"}}]}"#,
			"not json",
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"content":"B"}}]}"#,
			"[DONE]",
		])
		.await;
		let deltas: Vec<_> = events
			.iter()
			.filter(|(n, _)| n == "content_block_delta")
			.map(|(_, v)| v["delta"]["text"].as_str().unwrap().to_string())
			.collect();
		assert_eq!(deltas, vec!["A", "B"]);
	}

	#[tokio::test]
	async fn block_indices_are_dense_and_starts_equal_stops() {
		let events = run(&[
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"content":"A"}}]}"#,
			r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"tool_calls":[{"index":0,"id":"c1","function":{"name":"f","arguments":"{}"}}]}}]}"#,
			"[DONE]",
		])
		.await;
		let starts: Vec<i64> = events
			.iter()
			.filter(|(n, _)| n == "content_block_start")
			.map(|(_, v)| v["index"].as_i64().unwrap())
			.collect();
		let stops: Vec<i64> = events
			.iter()
			.filter(|(n, _)| n == "content_block_stop")
			.map(|(_, v)| v["index"].as_i64().unwrap())
			.collect();
		assert_eq!(starts, vec![0, 1]);
		assert_eq!(stops, vec![0, 1]);
	}

	#[tokio::test]
	async fn empty_stream_still_emits_message_start_and_stop_on_done() {
		let events = run(&["[DONE]"]).await;
		let names: Vec<_> = events.iter().map(|(n, _)| n.as_str()).collect();
		assert_eq!(names, vec!["message_start", "message_delta", "message_stop"]);
	}

	#[tokio::test]
	async fn cancellation_stops_before_next_frame() {
		let token = CancellationToken::new();
		token.cancel();
		let out = translate_stream(
			canonical_frames(&[
				r#"{"id":"x","model":"m","choices":[{"index":0,"delta":{"content":"A"}}]}"#,
			]),
			token,
		);
		let frames: Vec<_> = out.collect().await;
		assert_eq!(frames.len(), 1);
		assert!(matches!(frames[0], Err(StreamError::Cancelled)));
	}
}
