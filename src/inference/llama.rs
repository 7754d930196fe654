//! llama.cpp session for the embedded backend (`llama` feature).
//!
//! Sampling is greedy so the same prompt yields the same completion on every
//! validator that replays the input.

use super::embedded::ModelSession;
use crate::error::InferenceError;
use llama_cpp_2::context::LlamaContext;
use llama_cpp_2::context::params::LlamaContextParams;
use llama_cpp_2::llama_backend::LlamaBackend;
use llama_cpp_2::llama_batch::LlamaBatch;
use llama_cpp_2::model::params::LlamaModelParams;
use llama_cpp_2::model::{AddBos, LlamaModel, Special};
use llama_cpp_2::sampling::LlamaSampler;
use std::num::NonZeroU32;
use std::path::Path;

fn model_error(err: impl std::fmt::Display) -> InferenceError {
    InferenceError::Model(err.to_string())
}

pub struct LlamaSession {
    model: &'static LlamaModel,
    ctx: LlamaContext<'static>,
    sampler: LlamaSampler,
    system_prompt: String,
    max_tokens: u32,
}

impl LlamaSession {
    /// Load the model and create its context.
    ///
    /// Backend and model are leaked: the session lives on the worker thread
    /// until the process exits, and the context borrows both.
    pub fn load(
        model_path: &Path,
        context_size: u32,
        max_tokens: u32,
        system_prompt: String,
    ) -> Result<Self, InferenceError> {
        let init_error = |err: &dyn std::fmt::Display| InferenceError::Init {
            backend: "embedded".into(),
            message: err.to_string(),
        };

        if !model_path.exists() {
            return Err(init_error(&format!(
                "model file {} not found",
                model_path.display()
            )));
        }

        let backend: &'static LlamaBackend =
            Box::leak(Box::new(LlamaBackend::init().map_err(|e| init_error(&e))?));
        let model: &'static LlamaModel = Box::leak(Box::new(
            LlamaModel::load_from_file(backend, model_path, &LlamaModelParams::default())
                .map_err(|e| init_error(&e))?,
        ));
        let ctx_params = LlamaContextParams::default().with_n_ctx(NonZeroU32::new(context_size));
        let ctx = model
            .new_context(backend, ctx_params)
            .map_err(|e| init_error(&e))?;

        Ok(Self {
            model,
            ctx,
            sampler: LlamaSampler::greedy(),
            system_prompt,
            max_tokens,
        })
    }

    fn render_prompt(&self, prompt: &str) -> String {
        format!(
            "System: {}\nUser: {prompt}\nAssistant:",
            self.system_prompt
        )
    }
}

impl ModelSession for LlamaSession {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn generate(&mut self, prompt: &str) -> Result<String, InferenceError> {
        self.ctx.clear_kv_cache();
        self.sampler.reset();

        let tokens = self
            .model
            .str_to_token(&self.render_prompt(prompt), AddBos::Always)
            .map_err(model_error)?;
        let n_ctx = self.ctx.n_ctx() as usize;
        if tokens.is_empty() || tokens.len() + self.max_tokens as usize > n_ctx {
            return Err(InferenceError::Model(format!(
                "prompt of {} tokens does not fit a {n_ctx}-token context",
                tokens.len()
            )));
        }

        let mut batch = LlamaBatch::new(n_ctx, 1);
        let last = tokens.len() - 1;
        for (i, token) in tokens.iter().enumerate() {
            batch
                .add(*token, i as i32, &[0], i == last)
                .map_err(model_error)?;
        }
        self.ctx.decode(&mut batch).map_err(model_error)?;

        let mut n_cur = batch.n_tokens();
        let mut output = Vec::new();
        for _ in 0..self.max_tokens {
            let token = self.sampler.sample(&self.ctx, batch.n_tokens() - 1);
            self.sampler.accept(token);
            if self.model.is_eog_token(token) {
                break;
            }
            output.extend(
                self.model
                    .token_to_bytes(token, Special::Tokenize)
                    .map_err(model_error)?,
            );

            batch.clear();
            batch.add(token, n_cur, &[0], true).map_err(model_error)?;
            n_cur += 1;
            self.ctx.decode(&mut batch).map_err(model_error)?;
        }

        Ok(String::from_utf8_lossy(&output).trim().to_string())
    }
}
