//! Request translation: foreign request bytes in, canonical request + routing metadata out.
//!
//! Grounded on `from_messages::translate_internal` in the retrieved agentgateway forks
//! (`other_examples/0f675b69`, `other_examples/13e5ac67`), adapted to this translator's stricter
//! invariants: empty-string/empty-text filtering, a hard error on `{"type":"tool"}` missing
//! `name`, and strict unknown-top-level-field rejection happening at the parse boundary.

use tracing::warn;

use crate::error::TranslationError;
use crate::llm::TranslatedRequest;
use crate::llm::types::{canonical, foreign};

pub const BACKEND_PATH: &str = "/v1/chat/completions";

pub fn translate(body: &[u8], max_body_size: usize) -> Result<TranslatedRequest, TranslationError> {
	if body.len() > max_body_size {
		return Err(TranslationError::RequestTooLarge);
	}

	let req: foreign::Request = serde_json::from_slice(body)?;
	validate(&req)?;

	let mut messages = Vec::new();

	if let Some(system) = &req.system {
		if let Some(text) = system_text(system)
			&& !text.is_empty()
		{
			messages.push(canonical::Message::system(text));
		}
	}

	for message in &req.messages {
		translate_message(message, &mut messages)?;
	}

	let tools = req
		.tools
		.as_ref()
		.map(|tools| tools.iter().map(translate_tool).collect::<Vec<_>>())
		.filter(|t: &Vec<_>| !t.is_empty());

	let tool_choice = req
		.tool_choice
		.as_ref()
		.map(translate_tool_choice)
		.transpose()?;

	let canonical = canonical::Request {
		model: req.model.clone(),
		messages,
		max_tokens: Some(req.max_tokens as u64),
		temperature: req.temperature,
		top_p: req.top_p,
		stop: req
			.stop_sequences
			.clone()
			.filter(|s| !s.is_empty())
			.map(Into::into),
		stream: req.stream,
		tools,
		tool_choice,
	};

	Ok(TranslatedRequest {
		canonical,
		model: req.model,
		streaming: req.stream,
		backend_path: BACKEND_PATH,
		response_metadata: None,
	})
}

pub(crate) fn validate(req: &foreign::Request) -> Result<(), TranslationError> {
	if req.model.is_empty() {
		return Err(TranslationError::MissingField("model"));
	}
	if req.messages.is_empty() {
		return Err(TranslationError::MissingField("messages"));
	}
	if req.max_tokens < 1 {
		return Err(TranslationError::OutOfRange {
			field: "max_tokens",
			value: req.max_tokens.to_string(),
		});
	}
	if let Some(t) = req.temperature
		&& !(0.0..=2.0).contains(&t)
	{
		return Err(TranslationError::OutOfRange {
			field: "temperature",
			value: t.to_string(),
		});
	}
	if let Some(p) = req.top_p
		&& !(0.0..=1.0).contains(&p)
	{
		return Err(TranslationError::OutOfRange {
			field: "top_p",
			value: p.to_string(),
		});
	}
	if let Some(k) = req.top_k
		&& k < 0
	{
		return Err(TranslationError::OutOfRange {
			field: "top_k",
			value: k.to_string(),
		});
	}
	Ok(())
}

fn system_text(system: &foreign::SystemPrompt) -> Option<String> {
	match system {
		foreign::SystemPrompt::Text(text) => Some(text.clone()),
		foreign::SystemPrompt::Blocks(blocks) => {
			let mut out = String::new();
			for block in blocks {
				if let foreign::ContentBlock::Text { text } = block {
					out.push_str(text);
				}
			}
			Some(out)
		},
	}
}

fn translate_message(
	message: &foreign::Message,
	out: &mut Vec<canonical::Message>,
) -> Result<(), TranslationError> {
	match &message.content {
		foreign::MessageContent::Text(text) => {
			if !text.is_empty() {
				out.push(match message.role {
					foreign::Role::User => canonical::Message::user(text.clone()),
					foreign::Role::Assistant => {
						canonical::Message::assistant(Some(text.clone()), None)
					},
				});
			}
		},
		foreign::MessageContent::Blocks(blocks) => match message.role {
			foreign::Role::User => translate_user_blocks(blocks, out),
			foreign::Role::Assistant => translate_assistant_blocks(blocks, out),
		},
	}
	Ok(())
}

fn translate_user_blocks(blocks: &[foreign::ContentBlock], out: &mut Vec<canonical::Message>) {
	let mut text = String::new();
	let mut tool_results = Vec::new();

	for block in blocks {
		match block {
			foreign::ContentBlock::Text { text: t } => text.push_str(t),
			foreign::ContentBlock::ToolResult {
				tool_use_id,
				content,
			} => tool_results.push((tool_use_id.clone(), tool_result_text(content))),
			foreign::ContentBlock::Image { .. } => {
				warn!("image content blocks are not translated in this revision; skipping");
			},
			foreign::ContentBlock::ToolUse { .. } | foreign::ContentBlock::Unknown => {},
		}
	}

	if !text.is_empty() {
		out.push(canonical::Message::user(text));
	}
	for (tool_use_id, content) in tool_results {
		out.push(canonical::Message::tool(tool_use_id, content));
	}
}

fn tool_result_text(content: &foreign::ToolResultContent) -> String {
	match content {
		foreign::ToolResultContent::Text(text) => text.clone(),
		foreign::ToolResultContent::Blocks(blocks) => {
			serde_json::to_string(blocks).unwrap_or_default()
		},
	}
}

fn translate_assistant_blocks(blocks: &[foreign::ContentBlock], out: &mut Vec<canonical::Message>) {
	let mut text = String::new();
	let mut tool_calls = Vec::new();

	for block in blocks {
		match block {
			foreign::ContentBlock::Text { text: t } => text.push_str(t),
			foreign::ContentBlock::ToolUse { id, name, input } => match (id, name) {
				(Some(id), Some(name)) => tool_calls.push(canonical::ToolCall {
					id: id.clone(),
					kind: canonical::ToolType::Function,
					function: canonical::FunctionCall {
						name: name.clone(),
						arguments: serde_json::to_string(input).unwrap_or_default(),
					},
				}),
				_ => warn!("tool_use block missing id or name; dropping"),
			},
			foreign::ContentBlock::ToolResult { .. }
			| foreign::ContentBlock::Image { .. }
			| foreign::ContentBlock::Unknown => {},
		}
	}

	if !text.is_empty() || !tool_calls.is_empty() {
		out.push(canonical::Message::assistant(
			if text.is_empty() { None } else { Some(text) },
			if tool_calls.is_empty() {
				None
			} else {
				Some(tool_calls)
			},
		));
	}
}

fn translate_tool(tool: &foreign::ToolDefinition) -> canonical::Tool {
	canonical::Tool {
		kind: canonical::ToolType::Function,
		function: canonical::FunctionDefinition {
			name: tool.name.clone(),
			description: tool.description.clone(),
			parameters: tool.input_schema.clone(),
		},
	}
}

fn translate_tool_choice(
	choice: &foreign::ToolChoice,
) -> Result<canonical::ToolChoice, TranslationError> {
	Ok(match choice {
		foreign::ToolChoice::Mode(mode) => match mode.as_str() {
			"auto" => canonical::ToolChoice::Mode(canonical::ToolChoice::AUTO.to_string()),
			"any" => canonical::ToolChoice::Mode(canonical::ToolChoice::REQUIRED.to_string()),
			"none" => canonical::ToolChoice::Mode(canonical::ToolChoice::NONE.to_string()),
			_ => canonical::ToolChoice::Mode(canonical::ToolChoice::AUTO.to_string()),
		},
		foreign::ToolChoice::Typed { r#type, name } => match r#type.as_str() {
			"auto" => canonical::ToolChoice::Mode(canonical::ToolChoice::AUTO.to_string()),
			"any" => canonical::ToolChoice::Mode(canonical::ToolChoice::REQUIRED.to_string()),
			"none" => canonical::ToolChoice::Mode(canonical::ToolChoice::NONE.to_string()),
			"tool" => {
				let name = name.clone().ok_or(TranslationError::InvalidToolChoice)?;
				canonical::ToolChoice::named(name)
			},
			_ => canonical::ToolChoice::Mode(canonical::ToolChoice::AUTO.to_string()),
		},
	})
}
