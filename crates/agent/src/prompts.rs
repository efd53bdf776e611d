//! Fixed instructions and message builders for the interior-design agent.

use interio_providers::llama_stack::{ContentItem, UserMessage};

/// System instructions for the long-lived chat agent.
pub const DESIGNER_INSTRUCTIONS: &str = "\
You are a professional **interior designer**.
All of your conversations should be framed from the perspective of an expert in interior design.
You will use precise design terminology and industry-standard vocabulary in your responses.
Always consider spatial harmony, materiality, color palettes, lighting, furniture style, and architectural context in your answers.
Never respond as a general assistant; always remain in your role as an interior designer.
When asked to give a prompt, it means a prompt for image generation. Always only directly answer the content of the prompt and nothing else, no prefix or suffix.
";

/// Task description sent ahead of every catalog retrieval query.
pub const RETRIEVAL_PROMPT: &str = r#"Your task is to retrieve relevant 3 matching images along with prices from memory bank using the RAG tool.
You will receive a query from the user.
Use the tool to perform the search.
Don't provide duplicated images.
Once you receive the tool result, don't repeatedly make another tool call, return 3 matching images to show their image paths and prices and description in the following example JSON array format.

Follow this JSON array example format exactly:
[
    {
        "image":"001.jpeg",
        "price":"$100",
        "description":"A beautiful table with a modern design."
    },
    {
        "image":"009.jpeg",
        "price":"$120",
        "description":"A stylish chair with a vintage look."
    },
    {
        "image":"006.jpeg",
        "price":"$160",
        "description":"A cozy sofa with a contemporary style."
    }
]
image paths are enclosed in <uri> tags but dont include tags themselves.
prices are enclosed in <price> tags but dont include tags themselves.
descriptions are summaries based on the corresponding image document.
Do not include explanations or extra characters.
"#;

/// A chat message: the image (as a data URL) first, then the text.
///
/// Returns `None` when there is neither.
pub fn chat_message(image_data_url: Option<String>, text: &str) -> Option<UserMessage> {
    let mut content = Vec::with_capacity(2);
    if let Some(uri) = image_data_url {
        content.push(ContentItem::image_uri(uri));
    }
    if !text.is_empty() {
        content.push(ContentItem::text(text));
    }
    (!content.is_empty()).then(|| UserMessage::new(content))
}

pub fn retrieval_message(description: &str) -> UserMessage {
    UserMessage::new(vec![
        ContentItem::text(RETRIEVAL_PROMPT),
        ContentItem::text(format!("Description: {description}")),
    ])
}
