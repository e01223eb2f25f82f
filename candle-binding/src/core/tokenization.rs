//! Tokenization Core Module
//!
//! Thin wrapper over `tokenizers::Tokenizer` that applies the sentiment
//! models' truncation settings once and turns encodings into candle tensors.

use anyhow::{Error as E, Result};
use candle_core::{Device, Tensor};
use tokenizers::{Encoding, Tokenizer, TruncationDirection, TruncationParams, TruncationStrategy};

/// Tokenization configuration
#[derive(Debug, Clone)]
pub struct TokenizationConfig {
    /// Maximum sequence length
    pub max_length: usize,
    /// Whether to add special tokens
    pub add_special_tokens: bool,
    /// Truncation strategy
    pub truncation_strategy: TruncationStrategy,
    /// Truncation direction
    pub truncation_direction: TruncationDirection,
}

impl Default for TokenizationConfig {
    fn default() -> Self {
        Self {
            max_length: 512,
            add_special_tokens: true,
            truncation_strategy: TruncationStrategy::LongestFirst,
            truncation_direction: TruncationDirection::Right,
        }
    }
}

impl TokenizationConfig {
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            ..Default::default()
        }
    }
}

/// Tokenization result for single text
#[derive(Debug, Clone)]
pub struct TokenizationResult {
    /// Token IDs
    pub token_ids: Vec<u32>,
    /// Attention mask
    pub attention_mask: Vec<u32>,
    /// Token strings
    pub tokens: Vec<String>,
}

impl TokenizationResult {
    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }
}

/// Tokenizer paired with one sentiment checkpoint
#[derive(Clone)]
pub struct SentimentTokenizer {
    tokenizer: Tokenizer,
    config: TokenizationConfig,
    device: Device,
}

impl SentimentTokenizer {
    /// Create a new tokenizer with truncation applied
    pub fn new(
        mut tokenizer: Tokenizer,
        config: TokenizationConfig,
        device: Device,
    ) -> Result<Self> {
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_length,
                strategy: config.truncation_strategy.clone(),
                stride: 0,
                direction: config.truncation_direction.clone(),
            }))
            .map_err(E::msg)?;
        // Single-sequence inference never needs padding
        tokenizer.with_padding(None);

        Ok(Self {
            tokenizer,
            config,
            device,
        })
    }

    /// Load `tokenizer.json` from disk
    pub fn from_file(
        tokenizer_path: &str,
        config: TokenizationConfig,
        device: Device,
    ) -> Result<Self> {
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| E::msg(format!("Failed to load tokenizer {}: {}", tokenizer_path, e)))?;
        Self::new(tokenizer, config, device)
    }

    pub fn config(&self) -> &TokenizationConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Tokenize one text. Empty input still yields the special tokens.
    pub fn tokenize(&self, text: &str) -> Result<TokenizationResult> {
        let encoding = self
            .tokenizer
            .encode(text, self.config.add_special_tokens)
            .map_err(E::msg)?;
        Ok(Self::encoding_to_result(&encoding))
    }

    fn encoding_to_result(encoding: &Encoding) -> TokenizationResult {
        TokenizationResult {
            token_ids: encoding.get_ids().to_vec(),
            attention_mask: encoding.get_attention_mask().to_vec(),
            tokens: encoding.get_tokens().to_vec(),
        }
    }

    /// Create `(1, seq_len)` token id and attention mask tensors
    pub fn create_tensors(&self, result: &TokenizationResult) -> Result<(Tensor, Tensor)> {
        if result.is_empty() {
            return Err(E::msg(
                "tokenizer produced no tokens; cannot build model input",
            ));
        }

        let token_ids_tensor = Tensor::new(&result.token_ids[..], &self.device)?.unsqueeze(0)?;
        let attention_mask_tensor =
            Tensor::new(&result.attention_mask[..], &self.device)?.unsqueeze(0)?;

        Ok((token_ids_tensor, attention_mask_tensor))
    }

    /// Tokenize and build tensors in one step
    pub fn encode_to_tensors(&self, text: &str) -> Result<(Tensor, Tensor)> {
        let result = self.tokenize(text)?;
        self.create_tensors(&result)
    }
}

impl std::fmt::Debug for SentimentTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentTokenizer")
            .field("max_length", &self.config.max_length)
            .field("device", &self.device)
            .finish()
    }
}
