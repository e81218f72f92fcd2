//! The canonical (OpenAI chat-completions-shaped) schema every backend speaks. Hand-rolled and
//! trimmed to the fields this translator actually produces or consumes, rather than a full
//! mirror of the wire format's long tail of vendor options.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::serdes::is_default;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	System,
	User,
	Assistant,
	Tool,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
	Function,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stop {
	One(String),
	Many(Vec<String>),
}

impl From<Vec<String>> for Stop {
	fn from(mut v: Vec<String>) -> Self {
		if v.len() == 1 {
			Stop::One(v.pop().unwrap())
		} else {
			Stop::Many(v)
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
	pub name: String,
	pub arguments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
	pub id: String,
	#[serde(rename = "type")]
	pub kind: ToolType,
	pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
	#[serde(rename = "type")]
	pub kind: ToolType,
	pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionName {
	pub name: String,
}

/// `auto|required|none` (bare string) or `{"type":"function","function":{"name":...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolChoice {
	Mode(String),
	Named {
		#[serde(rename = "type")]
		kind: ToolType,
		function: FunctionName,
	},
}

impl ToolChoice {
	pub const AUTO: &'static str = "auto";
	pub const REQUIRED: &'static str = "required";
	pub const NONE: &'static str = "none";

	pub fn named(name: impl Into<String>) -> Self {
		ToolChoice::Named {
			kind: ToolType::Function,
			function: FunctionName { name: name.into() },
		}
	}
}

/// One canonical turn. `content` is `None` for an assistant message that only carries
/// `tool_calls`; a tool-only assistant turn always has `content = null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
	pub role: Role,
	/// Always serialised, even when `None`. A tool-only assistant turn's canonical `content` must
	/// appear as an explicit JSON `null`, not be omitted.
	#[serde(default)]
	pub content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_call_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
	pub fn system(content: String) -> Self {
		Message {
			role: Role::System,
			content: Some(content),
			tool_call_id: None,
			tool_calls: None,
		}
	}

	pub fn user(content: String) -> Self {
		Message {
			role: Role::User,
			content: Some(content),
			tool_call_id: None,
			tool_calls: None,
		}
	}

	pub fn tool(tool_call_id: String, content: String) -> Self {
		Message {
			role: Role::Tool,
			content: Some(content),
			tool_call_id: Some(tool_call_id),
			tool_calls: None,
		}
	}

	pub fn assistant(content: Option<String>, tool_calls: Option<Vec<ToolCall>>) -> Self {
		Message {
			role: Role::Assistant,
			content,
			tool_call_id: None,
			tool_calls,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Request {
	pub model: String,
	pub messages: Vec<Message>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_tokens: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub temperature: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub top_p: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stop: Option<Stop>,
	#[serde(default, skip_serializing_if = "is_default")]
	pub stream: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tools: Option<Vec<Tool>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_choice: Option<ToolChoice>,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct Usage {
	#[serde(default)]
	pub prompt_tokens: u64,
	#[serde(default)]
	pub completion_tokens: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMessage {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
	#[serde(default)]
	pub index: u32,
	/// Absent (or `null`) when the backend returns a choice with no message at all; the response
	/// translator treats that as an unprocessable backend response rather than a parse failure.
	#[serde(default)]
	pub message: Option<ResponseMessage>,
	/// Left as a free string rather than a closed enum: any value outside `{stop, tool_calls,
	/// length}`, including values this schema doesn't enumerate, falls back to `end_turn`, which
	/// a strict enum can't represent without failing to parse first.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub model: String,
	#[serde(default)]
	pub choices: Vec<Choice>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionCallChunk {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub arguments: Option<String>,
}

/// A sparse per-chunk tool-call fragment. `index` is the canonical tool-call slot, not
/// necessarily dense, and not the same numbering as the foreign content-block index it must be
/// mapped through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallChunk {
	pub index: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub function: Option<FunctionCallChunk>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tool_calls: Option<Vec<ToolCallChunk>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceDelta {
	#[serde(default)]
	pub index: u32,
	#[serde(default)]
	pub delta: Delta,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamResponse {
	#[serde(default)]
	pub id: String,
	#[serde(default)]
	pub model: String,
	#[serde(default)]
	pub choices: Vec<ChoiceDelta>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub usage: Option<Usage>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stop_from_single_entry_is_bare_string_on_the_wire() {
		let stop: Stop = vec!["STOP".to_string()].into();
		let json = serde_json::to_value(&stop).unwrap();
		assert_eq!(json, serde_json::json!("STOP"));
	}

	#[test]
	fn stop_from_multiple_entries_is_an_array_on_the_wire() {
		let stop: Stop = vec!["A".to_string(), "B".to_string()].into();
		let json = serde_json::to_value(&stop).unwrap();
		assert_eq!(json, serde_json::json!(["A", "B"]));
	}

	#[test]
	fn tool_only_assistant_message_has_null_content() {
		let msg = Message::assistant(
			None,
			Some(vec![ToolCall {
				id: "c1".to_string(),
				kind: ToolType::Function,
				function: FunctionCall {
					name: "get_weather".to_string(),
					arguments: "{}".to_string(),
				},
			}]),
		);
		let json = serde_json::to_value(&msg).unwrap();
		assert_eq!(json["content"], serde_json::Value::Null);
		assert!(json["tool_calls"].is_array());
	}

	#[test]
	fn unrecognised_finish_reason_deserialises_without_error() {
		let choice: Choice = serde_json::from_value(serde_json::json!({
			"index": 0,
			"message": {"content": "hi"},
			"finish_reason": "some_future_value",
		}))
		.unwrap();
		assert_eq!(choice.finish_reason.as_deref(), Some("some_future_value"));
	}

	#[test]
	fn choice_with_no_message_key_deserialises_to_none() {
		let choice: Choice = serde_json::from_value(serde_json::json!({
			"index": 0,
			"finish_reason": "stop",
		}))
		.unwrap();
		assert!(choice.message.is_none());
	}
}
