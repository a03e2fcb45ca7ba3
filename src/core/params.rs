//! Shared evaluation parameters and their evaluator flag syntax.
use std::ffi::OsString;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::LanguageCode;

/// Evaluation parameters shared by every language of a sweep.
/// Suitable for config files; values are passed through unchecked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunParameters {
    /// Serialized fine-tuned model weights
    pub model_path: PathBuf,
    pub max_answer_length: u32,
    /// Maximum tokenized input length
    pub max_length: u32,
    /// Overlap between consecutive windows of a long context
    pub doc_stride: u32,
    pub n_best_size: u32,
    pub batch_size: u32,
    /// Compute device selector, e.g. `cuda` or `cpu`
    pub device: String,

    // Optional evaluator options, only forwarded when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub huggingface_model_checkpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub squad_v2: Option<bool>,
    /// Appended verbatim after every other option
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl Default for RunParameters {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("/mnt/hdd/canine/models/canine_model.pt"),
            max_answer_length: 256,
            max_length: 2048,
            doc_stride: 512,
            n_best_size: 20,
            batch_size: 8,
            device: "cuda".to_string(),
            dataset_name: None,
            data_dir: None,
            huggingface_model_checkpoint: None,
            squad_v2: None,
            extra_args: Vec::new(),
        }
    }
}

impl RunParameters {
    /// Evaluator arguments for one language, in the evaluator's flag syntax
    pub fn to_args(&self, language: &LanguageCode) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(16 + self.extra_args.len());
        let mut push = |flag: &str, value: OsString| {
            args.push(flag.into());
            args.push(value);
        };

        push("--model_path", self.model_path.clone().into_os_string());
        push("--language", language.as_str().into());
        push("--max_answer_length", self.max_answer_length.to_string().into());
        push("--max_length", self.max_length.to_string().into());
        push("--doc_stride", self.doc_stride.to_string().into());
        push("--n_best_size", self.n_best_size.to_string().into());
        push("--batch_size", self.batch_size.to_string().into());
        push("--device", self.device.as_str().into());

        if let Some(name) = &self.dataset_name {
            push("--dataset_name", name.as_str().into());
        }
        if let Some(dir) = &self.data_dir {
            push("--data_dir", dir.clone().into_os_string());
        }
        if let Some(checkpoint) = &self.huggingface_model_checkpoint {
            push("--huggingface_model_checkpoint", checkpoint.as_str().into());
        }
        if let Some(v2) = self.squad_v2 {
            push("--squad_v2", v2.to_string().into());
        }

        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }
}
