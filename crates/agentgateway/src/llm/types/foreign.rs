//! The foreign wire schema: an Anthropic-Messages-shaped request/response/stream-event set.
//!
//! The request side parses strictly, rejecting unknown top-level keys, while nested shapes stay
//! permissive, matching how the rest of this gateway's typed Anthropic models are built.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	User,
	Assistant,
}

/// A message's `content`: either a bare string or an ordered sequence of content blocks.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
	Text(String),
	Blocks(Vec<ContentBlock>),
}

/// The system prompt: a bare string, or an ordered sequence of content blocks of which only
/// `text` is semantically meaningful.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SystemPrompt {
	Text(String),
	Blocks(Vec<ContentBlock>),
}

/// One turn. `role` is restricted to `user`/`assistant`; canonical's `system`/`tool` roles are
/// synthesised by the request translator, never accepted on input.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
	pub role: Role,
	pub content: MessageContent,
}

/// A tagged content block: a sealed sum type in place of a "union with extra fields" record, so
/// there's no way to construct a `tool_use` block missing `name`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
	Text {
		text: String,
	},
	/// `id`/`name` are optional at the type level even though every well-formed `tool_use` block
	/// carries both: a block missing either is a recoverable condition (drop that entry, keep
	/// translating) rather than a parse failure, which a required `String` field can't represent
	/// without rejecting the whole request.
	ToolUse {
		#[serde(default)]
		id: Option<String>,
		#[serde(default)]
		name: Option<String>,
		#[serde(default)]
		input: Value,
	},
	ToolResult {
		tool_use_id: String,
		content: ToolResultContent,
	},
	Image {
		source: ImageSource,
	},
	/// Anything this gateway doesn't round-trip. Accepted on input so an unrelated unknown
	/// content-block shape inside a message doesn't trip the top-level strict-parsing rule;
	/// contributes nothing during translation.
	#[serde(other)]
	Unknown,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ToolResultContent {
	Text(String),
	Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
	Base64 {
		media_type: String,
		data: String,
	},
	Url {
		url: String,
	},
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolDefinition {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub input_schema: Value,
}

/// Either the bare-string shorthand (`"auto"`, `"any"`, `"none"`, or anything else; the
/// translator falls back to `auto` for anything it doesn't recognise) or the typed object form
/// `{"type": "tool", "name": ...}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ToolChoice {
	Mode(String),
	Typed {
		r#type: String,
		#[serde(default, skip_serializing_if = "Option::is_none")]
		name: Option<String>,
	},
}

/// The strictly-parsed foreign request. Unknown top-level keys are rejected: `deny_unknown_fields`
/// is the one place in this schema that matters, since an unrecognised key is a fatal client
/// error rather than something to silently drop.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
	pub model: String,
	pub messages: Vec<Message>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub system: Option<SystemPrompt>,
	pub max_tokens: i64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub top_p: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub top_k: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stop_sequences: Option<Vec<String>>,
	#[serde(default)]
	pub stream: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tools: Option<Vec<ToolDefinition>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_choice: Option<ToolChoice>,
	/// Opaque: surfaced to the response-translator's metadata, never forwarded to the backend.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub thinking: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Value>,
}

#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
	EndTurn,
	MaxTokens,
	StopSequence,
	ToolUse,
	Refusal,
	PauseTurn,
	ModelContextWindowExceeded,
}

#[derive(Copy, Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Usage {
	pub input_tokens: u64,
	pub output_tokens: u64,
}

/// The unary (and `message_start`-embedded) foreign response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Response {
	pub id: String,
	pub r#type: String,
	pub role: Role,
	pub model: String,
	pub content: Vec<ContentBlock>,
	pub stop_reason: Option<StopReason>,
	pub stop_sequence: Option<String>,
	pub usage: Usage,
}

impl Response {
	pub fn new(id: String, model: String) -> Self {
		Response {
			id,
			r#type: "message".to_string(),
			role: Role::Assistant,
			model,
			content: Vec::new(),
			stop_reason: None,
			stop_sequence: None,
			usage: Usage::default(),
		}
	}
}

/// The block shape carried by `content_block_start`. Distinct from [`ContentBlock`] because a
/// `tool_use` block opens with only `id`/`name`; its `input` only exists once the argument
/// deltas have been accumulated and parsed, which never happens over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamBlockOpen {
	Text { text: String },
	ToolUse { id: String, name: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlockDelta {
	TextDelta { text: String },
	InputJsonDelta { partial_json: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDelta {
	pub stop_reason: Option<StopReason>,
	pub stop_sequence: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MessageDeltaUsage {
	pub input_tokens: u64,
	pub output_tokens: u64,
}

/// The foreign SSE event protocol, in emission order. Serialize-only in practice, since this
/// gateway never needs to parse its own stream back in, but `Deserialize` is kept for tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
	MessageStart {
		message: Response,
	},
	ContentBlockStart {
		index: usize,
		content_block: StreamBlockOpen,
	},
	ContentBlockDelta {
		index: usize,
		delta: ContentBlockDelta,
	},
	ContentBlockStop {
		index: usize,
	},
	MessageDelta {
		delta: MessageDelta,
		usage: MessageDeltaUsage,
	},
	MessageStop,
}

impl StreamEvent {
	pub fn event_name(&self) -> &'static str {
		match self {
			StreamEvent::MessageStart { .. } => "message_start",
			StreamEvent::ContentBlockStart { .. } => "content_block_start",
			StreamEvent::ContentBlockDelta { .. } => "content_block_delta",
			StreamEvent::ContentBlockStop { .. } => "content_block_stop",
			StreamEvent::MessageDelta { .. } => "message_delta",
			StreamEvent::MessageStop => "message_stop",
		}
	}

	pub fn into_sse_tuple(self) -> (&'static str, StreamEvent) {
		(self.event_name(), self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_unknown_top_level_field() {
		let body = serde_json::json!({
			"model": "m",
			"messages": [{"role": "user", "content": "hi"}],
			"max_tokens": 10,
			"nonsense": true,
		});
		let err = serde_json::from_value::<Request>(body).unwrap_err();
		assert!(err.to_string().contains("nonsense") || err.to_string().contains("unknown field"));
	}

	#[test]
	fn accepts_string_and_block_content() {
		let body = serde_json::json!({
			"model": "m",
			"max_tokens": 10,
			"messages": [
				{"role": "user", "content": "hi"},
				{"role": "assistant", "content": [{"type": "text", "text": "hello"}]},
			],
		});
		let req: Request = serde_json::from_value(body).unwrap();
		assert!(matches!(req.messages[0].content, MessageContent::Text(_)));
		assert!(matches!(req.messages[1].content, MessageContent::Blocks(_)));
	}

	#[test]
	fn tool_choice_accepts_bare_string_and_typed_object() {
		let mode: ToolChoice = serde_json::from_value(serde_json::json!("auto")).unwrap();
		assert!(matches!(mode, ToolChoice::Mode(m) if m == "auto"));

		let typed: ToolChoice =
			serde_json::from_value(serde_json::json!({"type": "tool", "name": "get_weather"}))
				.unwrap();
		assert!(matches!(typed, ToolChoice::Typed { name: Some(n), .. } if n == "get_weather"));
	}

	#[test]
	fn unknown_content_block_shape_is_accepted_as_unknown() {
		let block: ContentBlock =
			serde_json::from_value(serde_json::json!({"type": "thinking", "thinking": "..."}))
				.unwrap();
		assert!(matches!(block, ContentBlock::Unknown));
	}

	#[test]
	fn stream_event_names_match_wire_protocol() {
		assert_eq!(StreamEvent::MessageStop.event_name(), "message_stop");
		assert_eq!(
			StreamEvent::ContentBlockStop { index: 0 }.event_name(),
			"content_block_stop"
		);
	}
}
