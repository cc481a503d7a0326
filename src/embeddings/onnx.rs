//! ONNX Runtime embedder for sentence-transformers models

use super::similarity::normalize;
use super::EmbeddingEngine;
use anyhow::{anyhow, bail, Context, Result};
use ndarray::Array2;
use ort::{inputs, session::Session, value::Value};
use std::path::Path;
use tokenizers::Tokenizer;
use tracing::debug;

/// ONNX-based embedding generator
pub struct OnnxEmbedder {
    session: Session,
    tokenizer: Tokenizer,
    dimension: usize,
    model_name: String,
    /// MiniLM graphs take token_type_ids, MPNet graphs do not
    uses_token_type_ids: bool,
}

impl OnnxEmbedder {
    /// Create a new ONNX embedder from model and tokenizer paths
    ///
    /// # Arguments
    /// * `model_path` - Path to ONNX model file
    /// * `tokenizer_path` - Path to tokenizer.json file
    /// * `model_name` - Registry name (e.g., "all-minilm-l6-v2")
    /// * `dimension` - Embedding dimension (384 for MiniLM, 768 for MPNet)
    /// * `max_tokens` - Truncation length for the tokenizer
    pub fn new_from_paths(
        model_path: &Path,
        tokenizer_path: &Path,
        model_name: &str,
        dimension: usize,
        max_tokens: usize,
    ) -> Result<Self> {
        if !model_path.exists() {
            bail!(
                "ONNX model not found at: {}\n\nDownload it with:\n  simscope model add {}",
                model_path.display(),
                model_name
            );
        }

        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(model_path)
            .context("Failed to load ONNX model")?;

        if !tokenizer_path.exists() {
            bail!(
                "Tokenizer not found at: {}\n\nDownload it with:\n  simscope model add {}",
                tokenizer_path.display(),
                model_name
            );
        }

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;

        // Longer inputs fail to broadcast against the position embeddings
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: max_tokens.max(1),
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        let uses_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");

        debug!(
            model = model_name,
            dimension, uses_token_type_ids, "loaded ONNX session"
        );

        Ok(Self {
            session,
            tokenizer,
            dimension,
            model_name: model_name.to_string(),
            uses_token_type_ids,
        })
    }

    /// Tokenize text into input_ids and attention_mask
    fn tokenize(&self, text: &str) -> Result<(Vec<i64>, Vec<i64>)> {
        let encoding = self
            .tokenizer
            .encode(text, true) // Add special tokens ([CLS], [SEP])
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let input_ids = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let attention_mask = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| x as i64)
            .collect();

        Ok((input_ids, attention_mask))
    }

    /// Mean pooling - average token embeddings weighted by attention mask
    fn mean_pooling(&self, token_embeddings: &Array2<f32>, attention_mask: &[i64]) -> Vec<f32> {
        let mask_sum: f32 = attention_mask.iter().map(|&x| x as f32).sum();

        if mask_sum == 0.0 {
            return vec![0.0; self.dimension];
        }

        let mut pooled = vec![0.0; self.dimension];
        for (i, &mask) in attention_mask.iter().enumerate() {
            if mask == 1 && i < token_embeddings.nrows() {
                for (j, value) in pooled.iter_mut().enumerate() {
                    *value += token_embeddings[[i, j]];
                }
            }
        }

        pooled.iter().map(|&x| x / mask_sum).collect()
    }

    /// Run the graph and return `[seq_len, hidden_dim]` token embeddings
    fn token_embeddings(&mut self, input_ids: Vec<i64>, attention_mask: Vec<i64>) -> Result<Array2<f32>> {
        let seq_len = input_ids.len();
        let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
            .context("Failed to create input_ids array")?;
        let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask)
            .context("Failed to create attention_mask array")?;

        let outputs = if self.uses_token_type_ids {
            // All zeros for single-sentence embeddings
            let token_type_ids_array = Array2::from_shape_vec((1, seq_len), vec![0i64; seq_len])
                .context("Failed to create token_type_ids array")?;
            self.session.run(inputs![
                "input_ids" => Value::from_array(input_ids_array)?,
                "attention_mask" => Value::from_array(attention_mask_array)?,
                "token_type_ids" => Value::from_array(token_type_ids_array)?
            ])
        } else {
            self.session.run(inputs![
                "input_ids" => Value::from_array(input_ids_array)?,
                "attention_mask" => Value::from_array(attention_mask_array)?
            ])
        }
        .context("ONNX inference failed")?;

        let (shape, data) = outputs["last_hidden_state"]
            .try_extract_tensor::<f32>()
            .context("Failed to extract last_hidden_state tensor")?;

        // Shape is [batch_size=1, seq_len, hidden_dim]
        let shape_dims = shape.as_ref();
        if shape_dims.len() != 3 {
            bail!("Expected 3D tensor, got shape: {:?}", shape_dims);
        }

        let seq_len = shape_dims[1] as usize;
        let hidden_dim = shape_dims[2] as usize;
        if hidden_dim != self.dimension {
            bail!(
                "Model '{}' produced {}-dimensional tokens, registry says {}",
                self.model_name,
                hidden_dim,
                self.dimension
            );
        }

        let batch_offset = seq_len * hidden_dim;
        Array2::from_shape_vec((seq_len, hidden_dim), data[0..batch_offset].to_vec())
            .context("Failed to reshape token embeddings")
    }
}

impl EmbeddingEngine for OnnxEmbedder {
    fn encode(&mut self, text: &str, normalize_output: bool) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) = self.tokenize(text)?;
        let token_embeddings = self.token_embeddings(input_ids, attention_mask.clone())?;

        let embedding = self.mean_pooling(&token_embeddings, &attention_mask);

        if normalize_output {
            Ok(normalize(&embedding))
        } else {
            Ok(embedding)
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
