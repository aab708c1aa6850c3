// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Remote vision provider presets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known OpenAI-compatible vision providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
    Groq,
    Ollama,
    Custom,
}

impl ProviderKind {
    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Groq => "groq",
            ProviderKind::Ollama => "ollama",
            ProviderKind::Custom => "custom",
        }
    }

    /// Chat-completions URL used when no endpoint is configured
    pub fn default_endpoint(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("https://api.openai.com/v1/chat/completions"),
            ProviderKind::OpenRouter => Some("https://openrouter.ai/api/v1/chat/completions"),
            ProviderKind::Groq => Some("https://api.groq.com/openai/v1/chat/completions"),
            ProviderKind::Ollama => Some("http://localhost:11434/v1/chat/completions"),
            ProviderKind::Custom => None,
        }
    }

    /// Vision-capable model used when no model is configured
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("gpt-4o-mini"),
            ProviderKind::OpenRouter => Some("openai/gpt-4o-mini"),
            ProviderKind::Groq => Some("llama-3.2-90b-vision-preview"),
            ProviderKind::Ollama => Some("llava"),
            ProviderKind::Custom => None,
        }
    }

    /// Local sidecars accept unauthenticated requests
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            "groq" => Ok(ProviderKind::Groq),
            "ollama" => Ok(ProviderKind::Ollama),
            "custom" => Ok(ProviderKind::Custom),
            other => Err(format!("unknown vision provider '{}'", other)),
        }
    }
}

/// Resolved settings for one remote provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
}

impl ProviderConfig {
    /// Whether a request can be attempted without touching the network
    pub fn is_configured(&self) -> bool {
        !self.endpoint.is_empty()
            && !self.model.is_empty()
            && (!self.kind.requires_api_key() || !self.api_key.trim().is_empty())
    }
}
