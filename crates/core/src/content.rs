//! Compiled-in guide content, one markdown document per language.
//!
//! Pages that cannot (or prefer not to) fetch the markdown sources load the
//! guide from here; the documents go through the same [`parse_guide`] path as
//! fetched content.

use crate::section::{GuideDocument, Language, parse_guide};

/// Embedded English guide source.
pub const GUIDE_EN: &str = r#"## Application Scenarios

Chatline sits in your browser toolbar and answers questions with whichever AI provider you bring.

- Draft replies without leaving the page you are reading
- Summarize long articles into a few bullet points
- Translate selected text in place

No account is required to get started: install, pick a provider, and go.

## Supported Providers

Bring your own API key for any of the providers below.

| Provider | Streaming | Notes |
|----------|-----------|-------|
| OpenAI | Yes | GPT-4 class models |
| Anthropic | Yes | Claude models |
| Gemini | Yes | Requires a Google AI key |
| Ollama | Yes | Local models, no key needed |

Keys are stored in your browser only and sent directly to the provider.

## Basic Usage

1. Click the toolbar icon to open the panel
2. Paste your API key under **Settings**
   - Keys are validated with a single test request
   - A green dot means the provider is reachable
3. Type a question and press Enter

Use `Shift+Enter` for a newline without sending.

## Advanced Features

**Prompt presets** let you save instructions you reuse often.

```
/summarize  Condense the selection into three bullets.
/translate  Translate the selection into English.
```

Presets accept a leading slash in the input box. See [the preset reference](https://chatline.example/presets) for the full syntax.

## Privacy & Security

Your conversations never touch our servers.

- Messages go from your browser straight to the provider you chose
- API keys live in browser storage and are never synced
- The extension requests no permissions beyond the active tab

You can wipe all local data from **Settings → Reset**.

## Subscription & Billing

The extension is free with your own keys. Chatline Pro adds hosted models with no key setup.

| Plan | Price | Hosted requests |
|------|-------|-----------------|
| Free | $0 | — |
| Pro | $8/mo | 2,000 per month |

Subscriptions are billed through the website and can be cancelled any time from [the pricing page](https://chatline.example/pricing.html).

## Help & Support

Stuck on something this guide does not cover?

- Check the FAQ first: most setup issues are answered there
- Email **support@chatline.example** with your browser version
- Feature requests are welcome on the feedback board

We usually reply within one business day.
"#;

/// Embedded Simplified-Chinese guide source.
pub const GUIDE_ZH: &str = r#"## 应用场景

Chatline 常驻浏览器工具栏，用你自带的 AI 服务商回答问题。

- 不离开当前页面即可起草回复
- 将长文压缩为几条要点
- 就地翻译选中的文本

无需注册账号：安装、选择服务商，即可开始使用。

## 支持的服务商

以下服务商均可使用你自己的 API 密钥。

| 服务商 | 流式输出 | 备注 |
|--------|----------|------|
| OpenAI | 支持 | GPT-4 级别模型 |
| Anthropic | 支持 | Claude 系列模型 |
| Gemini | 支持 | 需要 Google AI 密钥 |
| Ollama | 支持 | 本地模型，无需密钥 |

密钥只保存在你的浏览器中，并直接发送给服务商。

## 基础使用

1. 点击工具栏图标打开面板
2. 在**设置**中粘贴你的 API 密钥
   - 密钥会通过一次测试请求进行验证
   - 绿点表示服务商连接正常
3. 输入问题并按回车发送

使用 `Shift+Enter` 换行而不发送。

## 高级功能

**提示词预设**可以保存你常用的指令。

```
/summarize  将选中内容压缩为三条要点。
/translate  将选中内容翻译为中文。
```

在输入框中以斜杠开头即可调用预设。完整语法见[预设参考](https://chatline.example/presets)。

## 隐私与安全

你的对话不会经过我们的服务器。

- 消息从你的浏览器直接发送到所选服务商
- API 密钥保存在浏览器本地，永不同步
- 扩展除当前标签页外不请求任何权限

可在**设置 → 重置**中清除全部本地数据。

## 订阅与计费

自带密钥时扩展完全免费。Chatline Pro 提供免配置的托管模型。

| 方案 | 价格 | 托管请求数 |
|------|------|------------|
| 免费版 | ¥0 | — |
| Pro | ¥58/月 | 每月 2,000 次 |

订阅通过官网完成，可随时在[价格页面](https://chatline.example/pricing.html)取消。

## 帮助与支持

本指南没有覆盖你的问题？

- 先查看常见问题：大多数配置问题都有答案
- 发邮件至 **support@chatline.example** 并附上浏览器版本
- 欢迎在反馈板提出功能建议

我们通常会在一个工作日内回复。
"#;

/// Parses the embedded document for one language.
pub fn embedded_document(language: Language) -> GuideDocument {
    match language {
        Language::En => parse_guide(GUIDE_EN),
        Language::Zh => parse_guide(GUIDE_ZH),
    }
}
