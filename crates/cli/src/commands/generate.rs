//! Generate command - write an article with a text generation provider

use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use std::sync::Arc;
use wechat_publisher_adapters::llm::{
    ChatCompletionsGenerator, GeneratorConfig, QwenGenerator, StubGenerator, default_model,
};
use wechat_publisher_domain::{
    TextGenerator,
    usecases::{ArticleLength, GenerateArticle, GenerateRequest},
};

use crate::args::GenerateArgs;
use crate::commands::{load_secret, open_store};
use crate::config::{AiConfig, AppConfig};

pub async fn execute(args: GenerateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let Some(length) = ArticleLength::parse(&args.length) else {
        bail!("Invalid length '{}': use short, medium or long", args.length);
    };

    let request = GenerateRequest {
        keyword: args.keyword.clone(),
        style: args.style.clone(),
        length,
        title: args.title.clone(),
    };

    let generator: Arc<dyn TextGenerator> = Arc::from(build_generator(&config.ai)?);
    let store = open_store(&config).await?;
    let usecase = GenerateArticle::new(generator, store);

    let content = usecase
        .generate(&request)
        .await
        .context("Failed to generate article")?;

    let saved = if args.save {
        Some(
            usecase
                .save(&content, &request.keyword, request.title.as_deref())
                .await
                .context("Failed to save generated article")?,
        )
    } else {
        None
    };

    if args.json {
        let output = serde_json::json!({
            "keyword": request.keyword,
            "content": content,
            "article_id": saved.as_ref().map(|a| a.id),
            "title": saved.as_ref().map(|a| a.title.clone()),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", content);
    if let Some(article) = saved {
        println!();
        println!("Saved as article {} ({})", article.id, article.title);
    }

    Ok(())
}

pub(crate) fn build_generator(config: &AiConfig) -> Result<Box<dyn TextGenerator>> {
    let provider = config.provider.trim();
    let generator_config = generator_config(config);
    let base_url = non_empty(&config.base_url);

    match provider {
        "glm" => {
            let api_key = load_secret(&config.api_key_env(), "glm")?;
            Ok(Box::new(ChatCompletionsGenerator::glm(
                api_key,
                base_url.as_deref(),
                generator_config,
            )))
        }
        "minimax" => {
            let api_key = load_secret(&config.api_key_env(), "minimax")?;
            Ok(Box::new(ChatCompletionsGenerator::minimax(
                api_key,
                base_url.as_deref(),
                generator_config,
            )))
        }
        "qwen" => {
            let api_key = load_secret(&config.api_key_env(), "qwen")?;
            match base_url {
                Some(url) => Ok(Box::new(QwenGenerator::with_base_url(
                    api_key,
                    url,
                    generator_config,
                ))),
                None => Ok(Box::new(QwenGenerator::new(api_key, generator_config))),
            }
        }
        "stub" => Ok(Box::new(StubGenerator::echo())),
        other => bail!("Unknown AI provider: {}", other),
    }
}

fn generator_config(config: &AiConfig) -> GeneratorConfig {
    let model = non_empty(&config.model)
        .or_else(|| default_model(config.provider.trim()).map(str::to_string))
        .unwrap_or_else(|| GeneratorConfig::default().model);

    GeneratorConfig {
        model,
        temperature: config.temperature,
        timeout_secs: config.timeout_secs,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_defaults_per_provider() {
        let config = AiConfig {
            provider: "qwen".to_string(),
            ..Default::default()
        };
        assert_eq!(generator_config(&config).model, "qwen-turbo");

        let config = AiConfig {
            provider: "minimax".to_string(),
            model: "abab5.5-chat".to_string(),
            ..Default::default()
        };
        assert_eq!(generator_config(&config).model, "abab5.5-chat");
    }

    #[test]
    fn test_stub_provider_needs_no_key() {
        let config = AiConfig {
            provider: "stub".to_string(),
            ..Default::default()
        };
        let generator = build_generator(&config).unwrap();
        assert_eq!(generator.provider(), "stub");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let config = AiConfig {
            provider: "gpt".to_string(),
            ..Default::default()
        };
        assert!(build_generator(&config).is_err());
    }
}
