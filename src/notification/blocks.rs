//! Slack Block Kit 结构和通知文档
//!
//! `NotificationDocument` 是一次发送的完整内容，构建完成后不再修改；
//! 每次发送都构建一个新的文档。

use serde::Serialize;

/// 按钮区块在没有说明文字时显示的占位符
pub const EMPTY_DESCRIPTION: &str = "|";

/// 文本对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::PlainText { text } | Self::Mrkdwn { text } => text,
        }
    }
}

/// 区块附件（目前只有链接按钮）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accessory {
    Button { text: TextObject, url: String },
}

/// 富文本样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    pub bold: bool,
}

/// 富文本片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextSpan {
    Text {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<TextStyle>,
    },
}

/// 富文本元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichTextElement {
    RichTextSection { elements: Vec<RichTextSpan> },
}

/// Block Kit 区块
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        text: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    RichText { elements: Vec<RichTextElement> },
}

impl Block {
    /// 纯文本区块
    pub fn plain_section(text: impl Into<String>) -> Self {
        Self::Section {
            text: TextObject::plain(text),
            accessory: None,
        }
    }

    /// 带链接按钮的区块
    pub fn button(label: &str, url: &str, description: &str) -> Self {
        let description = if description.is_empty() {
            EMPTY_DESCRIPTION
        } else {
            description
        };

        Self::Section {
            text: TextObject::mrkdwn(description),
            accessory: Some(Accessory::Button {
                text: TextObject::plain(label),
                url: url.to_string(),
            }),
        }
    }

    /// 「标题 : 」加粗 + 换行 + 内容 的富文本区块
    pub fn field(title: &str, value: &str) -> Self {
        Self::RichText {
            elements: vec![RichTextElement::RichTextSection {
                elements: vec![
                    RichTextSpan::Text {
                        text: format!("{} : \n", title),
                        style: Some(TextStyle { bold: true }),
                    },
                    RichTextSpan::Text {
                        text: value.to_string(),
                        style: None,
                    },
                ],
            }],
        }
    }
}

/// 一条 Slack 消息的内容
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationDocument {
    blocks: Vec<Block>,
}

impl NotificationDocument {
    /// 空文档（线程回复不带标题区块）
    pub fn new() -> Self {
        Self::default()
    }

    /// 以纯文本区块开头的文档
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![Block::plain_section(text)],
        }
    }

    /// 追加「标题 : 内容」区块；标题或内容为空时不做任何事
    pub fn field(mut self, title: &str, value: &str) -> Self {
        if title.is_empty() || value.is_empty() {
            return self;
        }
        self.blocks.push(Block::field(title, value));
        self
    }

    /// 追加链接按钮区块；标签或链接为空时不做任何事
    pub fn button(mut self, label: &str, url: &str, description: &str) -> Self {
        if label.is_empty() || url.is_empty() {
            return self;
        }
        self.blocks.push(Block::button(label, url, description));
        self
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
