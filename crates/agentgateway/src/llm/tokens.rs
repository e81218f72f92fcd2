//! Token counting: estimates input tokens from a foreign request body without calling a backend.
//! Deliberately not grounded on the original agentgateway's own tiktoken-based BPE counting
//! (`num_tokens_from_anthropic_messages` in `other_examples/c6391760`); the character-count
//! heuristic here is an estimate and must not be conflated with real tokenizer output.

use crate::error::TranslationError;
use crate::llm::types::foreign;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct TokenCount {
	pub input_tokens: u64,
	pub output_tokens: u64,
	pub total_tokens: u64,
}

/// Counts tokens for a foreign request body, applying the same bounded-read limit request
/// translation does and requiring strict parsing, so a body that would be rejected by
/// translation is rejected here too rather than silently estimated.
pub fn count(body: &[u8], max_body_size: usize) -> Result<TokenCount, TranslationError> {
	if body.len() > max_body_size {
		return Err(TranslationError::RequestTooLarge);
	}
	let req: foreign::Request = serde_json::from_slice(body)?;
	let chars = count_request_chars(&req);
	let input_tokens = (chars / 4).max(1) as u64;
	Ok(TokenCount {
		input_tokens,
		output_tokens: 0,
		total_tokens: input_tokens,
	})
}

fn count_request_chars(req: &foreign::Request) -> usize {
	let system = req.system.as_ref().map(system_chars).unwrap_or(0);
	let messages: usize = req.messages.iter().map(message_chars).sum();
	system + messages
}

fn system_chars(system: &foreign::SystemPrompt) -> usize {
	match system {
		foreign::SystemPrompt::Text(text) => text.chars().count(),
		foreign::SystemPrompt::Blocks(blocks) => blocks
			.iter()
			.map(|block| match block {
				foreign::ContentBlock::Text { text } => text.chars().count(),
				_ => 0,
			})
			.sum(),
	}
}

fn message_chars(message: &foreign::Message) -> usize {
	match &message.content {
		foreign::MessageContent::Text(text) => text.chars().count(),
		foreign::MessageContent::Blocks(blocks) => blocks.iter().map(block_chars).sum(),
	}
}

fn block_chars(block: &foreign::ContentBlock) -> usize {
	match block {
		foreign::ContentBlock::Text { text } => text.chars().count(),
		foreign::ContentBlock::ToolUse { name, input, .. } => {
			name.as_deref().map(|n| n.chars().count()).unwrap_or(0)
				+ serde_json::to_string(input)
					.map(|s| s.chars().count())
					.unwrap_or(0)
		},
		foreign::ContentBlock::ToolResult { content, .. } => match content {
			foreign::ToolResultContent::Text(text) => text.chars().count(),
			foreign::ToolResultContent::Blocks(blocks) => blocks.iter().map(block_chars).sum(),
		},
		foreign::ContentBlock::Image { .. } | foreign::ContentBlock::Unknown => 0,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn body(json: serde_json::Value) -> Vec<u8> {
		serde_json::to_vec(&json).unwrap()
	}

	#[test]
	fn scenario_six_matches_exact_count() {
		let req = body(serde_json::json!({
			"model": "m",
			"max_tokens": 10,
			"system": "You are helpful",
			"messages": [
				{"role": "user", "content": "Hello"},
				{"role": "assistant", "content": [{"type": "text", "text": "Hi there"}]},
			],
		}));
		let count = count(&req, 10 * 1024 * 1024).unwrap();
		assert_eq!(count.input_tokens, 7);
		assert_eq!(count.output_tokens, 0);
		assert_eq!(count.total_tokens, 7);
	}

	#[test]
	fn result_is_at_least_one() {
		let req = body(serde_json::json!({
			"model": "m",
			"max_tokens": 10,
			"messages": [{"role": "user", "content": "Hi"}],
		}));
		let count = count(&req, 10 * 1024 * 1024).unwrap();
		assert_eq!(count.input_tokens, 1);
	}

	#[test]
	fn image_blocks_contribute_nothing() {
		let req = body(serde_json::json!({
			"model": "m",
			"max_tokens": 10,
			"messages": [{"role": "user", "content": [
				{"type": "image", "source": {"type": "url", "url": "https://example.com/x.png"}},
			]}],
		}));
		let count = count(&req, 10 * 1024 * 1024).unwrap();
		assert_eq!(count.input_tokens, 1);
	}

	#[test]
	fn tool_use_counts_name_and_serialised_input() {
		let req = body(serde_json::json!({
			"model": "m",
			"max_tokens": 10,
			"messages": [{"role": "assistant", "content": [
				{"type": "tool_use", "id": "t1", "name": "f", "input": {"a": 1}},
			]}],
		}));
		let count = count(&req, 10 * 1024 * 1024).unwrap();
		// "f" (1) + len(r#"{"a":1}"#) (8) = 9 chars -> 9/4 = 2
		assert_eq!(count.input_tokens, 2);
	}

	#[test]
	fn oversize_body_rejects() {
		let req = body(serde_json::json!({
			"model": "m",
			"max_tokens": 10,
			"messages": [{"role": "user", "content": "hi"}],
		}));
		assert!(matches!(
			count(&req, req.len() - 1),
			Err(TranslationError::RequestTooLarge)
		));
	}
}
