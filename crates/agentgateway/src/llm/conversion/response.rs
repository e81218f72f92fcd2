//! Response translation, unary: canonical response in, foreign response out.
//!
//! Grounded on `from_messages::translate_response_internal` in the retrieved agentgateway forks
//! (`other_examples/0f675b69`), adapted so a foreign response always carries at least one
//! content block even when the canonical message has neither text nor tool calls.

use tracing::warn;

use crate::error::TranslationError;
use crate::ids::new_message_id;
use crate::llm::types::{canonical, foreign};

/// Builds a foreign response from a canonical response and the model name the request carried
/// (used as a fallback when the backend doesn't echo one back).
pub fn translate(canonical: canonical::Response) -> Result<foreign::Response, TranslationError> {
	let choice = canonical
		.choices
		.into_iter()
		.next()
		.ok_or(TranslationError::MissingChoices)?;
	let message = choice.message.ok_or(TranslationError::MissingMessage)?;

	let model = if canonical.model.is_empty() {
		"unknown".to_string()
	} else {
		canonical.model
	};

	let mut response = foreign::Response::new(new_message_id(), model);
	response.content = content_blocks(message);
	response.stop_reason = Some(stop_reason(choice.finish_reason.as_deref()));
	response.stop_sequence = None;
	response.usage = usage(canonical.usage);

	Ok(response)
}

fn content_blocks(message: canonical::ResponseMessage) -> Vec<foreign::ContentBlock> {
	let mut blocks = Vec::new();

	if let Some(text) = message.content
		&& !text.is_empty()
	{
		blocks.push(foreign::ContentBlock::Text { text });
	}

	if let Some(tool_calls) = message.tool_calls {
		for call in tool_calls {
			let input = serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
				warn!(
					"tool call {} arguments were not valid JSON ({e}); substituting an empty object",
					call.id
				);
				serde_json::Value::Object(Default::default())
			});
			blocks.push(foreign::ContentBlock::ToolUse {
				id: Some(call.id),
				name: Some(call.function.name),
				input,
			});
		}
	}

	if blocks.is_empty() {
		blocks.push(foreign::ContentBlock::Text {
			text: String::new(),
		});
	}

	blocks
}

/// Identical to the streaming transformer's mapping: anything outside `{stop, tool_calls,
/// length}`, including an absent `finish_reason`, falls back to `end_turn`.
pub fn stop_reason(finish_reason: Option<&str>) -> foreign::StopReason {
	match finish_reason {
		Some("stop") => foreign::StopReason::EndTurn,
		Some("tool_calls") => foreign::StopReason::ToolUse,
		Some("length") => foreign::StopReason::MaxTokens,
		_ => foreign::StopReason::EndTurn,
	}
}

fn usage(usage: Option<canonical::Usage>) -> foreign::Usage {
	let usage = usage.unwrap_or_default();
	foreign::Usage {
		input_tokens: usage.prompt_tokens,
		output_tokens: usage.completion_tokens,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn canonical_response(choices: Vec<canonical::Choice>) -> canonical::Response {
		canonical::Response {
			id: "chatcmpl-1".to_string(),
			model: "gpt-x".to_string(),
			choices,
			usage: Some(canonical::Usage {
				prompt_tokens: 3,
				completion_tokens: 2,
			}),
		}
	}

	#[test]
	fn simple_text_response_translates() {
		let resp = canonical_response(vec![canonical::Choice {
			index: 0,
			message: Some(canonical::ResponseMessage {
				content: Some("Hi".to_string()),
				tool_calls: None,
			}),
			finish_reason: Some("stop".to_string()),
		}]);
		let out = translate(resp).unwrap();
		assert!(out.id.starts_with("msg_01"));
		assert_eq!(out.model, "gpt-x");
		assert_eq!(out.stop_reason, Some(foreign::StopReason::EndTurn));
		assert_eq!(out.usage.input_tokens, 3);
		assert_eq!(out.usage.output_tokens, 2);
		assert!(matches!(&out.content[..], [foreign::ContentBlock::Text { text }] if text == "Hi"));
	}

	#[test]
	fn tool_call_response_translates_and_parses_arguments() {
		let resp = canonical_response(vec![canonical::Choice {
			index: 0,
			message: Some(canonical::ResponseMessage {
				content: None,
				tool_calls: Some(vec![canonical::ToolCall {
					id: "c1".to_string(),
					kind: canonical::ToolType::Function,
					function: canonical::FunctionCall {
						name: "get_weather".to_string(),
						arguments: "{\"location\":\"Melbourne\"}".to_string(),
					},
				}]),
			}),
			finish_reason: Some("tool_calls".to_string()),
		}]);
		let out = translate(resp).unwrap();
		assert_eq!(out.stop_reason, Some(foreign::StopReason::ToolUse));
		let block = &out.content[0];
		match block {
			foreign::ContentBlock::ToolUse { id, name, input } => {
				assert_eq!(id.as_deref(), Some("c1"));
				assert_eq!(name.as_deref(), Some("get_weather"));
				assert_eq!(input["location"], "Melbourne");
			},
			other => panic!("expected tool_use block, got {other:?}"),
		}
	}

	#[test]
	fn malformed_tool_arguments_substitute_empty_object_without_failing() {
		let resp = canonical_response(vec![canonical::Choice {
			index: 0,
			message: Some(canonical::ResponseMessage {
				content: None,
				tool_calls: Some(vec![canonical::ToolCall {
					id: "c1".to_string(),
					kind: canonical::ToolType::Function,
					function: canonical::FunctionCall {
						name: "f".to_string(),
						arguments: "not json".to_string(),
					},
				}]),
			}),
			finish_reason: None,
		}]);
		let out = translate(resp).unwrap();
		match &out.content[0] {
			foreign::ContentBlock::ToolUse { input, .. } => {
				assert_eq!(*input, serde_json::json!({}));
			},
			other => panic!("expected tool_use block, got {other:?}"),
		}
		assert_eq!(out.stop_reason, Some(foreign::StopReason::EndTurn));
	}

	#[test]
	fn empty_message_still_emits_one_block() {
		let resp = canonical_response(vec![canonical::Choice {
			index: 0,
			message: Some(canonical::ResponseMessage {
				content: None,
				tool_calls: None,
			}),
			finish_reason: None,
		}]);
		let out = translate(resp).unwrap();
		assert_eq!(out.content.len(), 1);
		assert!(matches!(&out.content[0], foreign::ContentBlock::Text { text } if text.is_empty()));
	}

	#[test]
	fn missing_choices_errors() {
		let resp = canonical_response(vec![]);
		assert!(matches!(
			translate(resp),
			Err(TranslationError::MissingChoices)
		));
	}

	#[test]
	fn choice_with_no_message_errors_as_missing_message() {
		let resp = canonical_response(vec![canonical::Choice {
			index: 0,
			message: None,
			finish_reason: Some("stop".to_string()),
		}]);
		assert!(matches!(
			translate(resp),
			Err(TranslationError::MissingMessage)
		));
	}
}
