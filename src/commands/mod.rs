pub mod compare;
pub mod config;
pub mod model;
pub mod session;

mod report;

use anyhow::Result;
use simscope::comparison::CompareConfig;
use simscope::embeddings::Metric;
use simscope::settings::Settings;

/// Comparison flags shared by `compare` and `session`; each one overrides
/// the matching setting from config.toml
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ComparisonOptions {
    /// Embedding model (registry name or HuggingFace id)
    #[arg(long)]
    pub model: Option<String>,

    /// Similarity metric: cosine, dot-product, euclidean
    #[arg(long)]
    pub metric: Option<String>,

    /// Lowercase both texts before embedding
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub lowercase: Option<bool>,

    /// Remove punctuation before embedding
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub strip_punctuation: Option<bool>,

    /// Run keyphrase extraction and keyword-only similarity
    #[arg(long, value_name = "BOOL", action = clap::ArgAction::Set)]
    pub keywords: Option<bool>,

    /// Keyphrases per text (3-20)
    #[arg(long)]
    pub top_k: Option<usize>,

    /// Shortest keyphrase in words (1-3)
    #[arg(long)]
    pub ngram_min: Option<usize>,

    /// Longest keyphrase in words (1-3)
    #[arg(long)]
    pub ngram_max: Option<usize>,

    /// Decision threshold for match labels
    #[arg(long)]
    pub threshold: Option<f32>,
}

impl ComparisonOptions {
    /// Layer flags over settings, returning the comparison config and threshold
    pub fn resolve(&self, settings: &Settings) -> Result<(CompareConfig, f32)> {
        let mut config = settings.compare_config();

        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(metric) = &self.metric {
            config.metric = metric.parse::<Metric>()?;
        }
        if let Some(lowercase) = self.lowercase {
            config.lowercase = lowercase;
        }
        if let Some(strip) = self.strip_punctuation {
            config.strip_punctuation = strip;
        }
        if let Some(keywords) = self.keywords {
            config.keywords.enabled = keywords;
        }
        if let Some(top_k) = self.top_k {
            config.keywords.top_k = top_k;
        }
        if let Some(ngram_min) = self.ngram_min {
            config.keywords.ngram_min = ngram_min;
        }
        if let Some(ngram_max) = self.ngram_max {
            config.keywords.ngram_max = ngram_max;
        }

        config.validate()?;
        Ok((config, self.threshold.unwrap_or(settings.threshold)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simscope::EngineError;

    #[test]
    fn test_flags_override_settings() {
        let options = ComparisonOptions {
            metric: Some("euclidean".to_string()),
            keywords: Some(false),
            threshold: Some(0.5),
            ..Default::default()
        };
        let (config, threshold) = options.resolve(&Settings::default()).unwrap();
        assert_eq!(config.metric, Metric::Euclidean);
        assert!(!config.keywords.enabled);
        assert!(config.lowercase);
        assert_eq!(threshold, 0.5);
    }

    #[test]
    fn test_flags_can_turn_settings_off_and_on() {
        let mut settings = Settings::default();
        settings.lowercase = false;
        settings.strip_punctuation = true;
        settings.keywords.enabled = false;

        let options = ComparisonOptions {
            lowercase: Some(true),
            strip_punctuation: Some(false),
            keywords: Some(true),
            ..Default::default()
        };
        let (config, _) = options.resolve(&settings).unwrap();
        assert!(config.lowercase);
        assert!(!config.strip_punctuation);
        assert!(config.keywords.enabled);

        let (config, _) = ComparisonOptions::default().resolve(&settings).unwrap();
        assert!(!config.lowercase);
        assert!(config.strip_punctuation);
        assert!(!config.keywords.enabled);
    }

    #[test]
    fn test_bool_flags_parse_explicit_values() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            options: ComparisonOptions,
        }

        let parsed = Wrapper::try_parse_from([
            "simscope",
            "--strip-punctuation",
            "false",
            "--keywords=true",
        ])
        .unwrap();
        assert_eq!(parsed.options.strip_punctuation, Some(false));
        assert_eq!(parsed.options.keywords, Some(true));
        assert_eq!(parsed.options.lowercase, None);

        assert!(Wrapper::try_parse_from(["simscope", "--lowercase"]).is_err());
    }

    #[test]
    fn test_unknown_metric_flag() {
        let options = ComparisonOptions {
            metric: Some("Bogus".to_string()),
            ..Default::default()
        };
        let err = options.resolve(&Settings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::UnknownMetric(m)) if m == "Bogus"
        ));
    }
}
