use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};

use crate::config::Config;
use crate::models::load_submission;
use crate::services::{GradingService, LlmService};
use crate::utils::logging::{log_startup, log_submission};
use crate::utils::report::render_report;
use crate::workflow::{GradingSession, Step};

/// 结果输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// 终端报告
    #[default]
    Report,
    /// 原始 JSON
    Json,
}

/// KET 写作 AI 批改
#[derive(Debug, Clone, Parser)]
#[command(name = "ket-examiner")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// 提交清单（TOML）
    #[arg(env = "SUBMISSION_FILE")]
    pub submission: Option<PathBuf>,

    /// 输出格式
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Report)]
    pub output: OutputFormat,

    /// 输出原始 JSON，等同于 `--output json`
    #[arg(long, conflicts_with = "output")]
    pub json: bool,
}

impl CliArgs {
    /// 实际使用的输出格式
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.output
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    grader: GradingService<LlmService>,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        log_startup(&config.llm_model_name, &config.llm_api_base_url);

        let backend = LlmService::new(&config).context("创建 HTTP 客户端失败")?;
        let grader = GradingService::new(backend, &config);

        Ok(Self { config, grader })
    }

    /// 运行一次批改
    pub async fn run(&self, args: &CliArgs) -> Result<()> {
        let path = args
            .submission
            .as_deref()
            .context("请指定提交清单: ket-examiner <submission.toml> 或设置 SUBMISSION_FILE")?;

        let session = self.grade_submission(path).await?;

        match (session.step(), session.result()) {
            (Step::Result, Some(result)) => {
                match args.output_format() {
                    OutputFormat::Report => println!("{}", render_report(result)),
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
                }
                Ok(())
            }
            _ => bail!("{}", session.error().unwrap_or("评分未完成")),
        }
    }

    /// 上传 → 批改，返回结束后的会话
    async fn grade_submission(&self, path: &Path) -> Result<GradingSession> {
        let submission = load_submission(path).await?;
        log_submission(submission.task_type, submission.pairs.len());

        let mut session = GradingSession::new();
        session.select_task_type(submission.task_type)?;

        let required = submission.task_type.required_pairs();
        if submission.pairs.len() > required {
            warn!(
                "⚠️ 题型 {} 只需要 {} 组图片，多余的 {} 组将被忽略",
                submission.task_type,
                required,
                submission.pairs.len() - required
            );
        }
        for (idx, pair) in submission.pairs.into_iter().take(required).enumerate() {
            session.set_pair(idx, pair)?;
        }

        if !session.is_ready() {
            bail!(
                "题型 {} 需要 {} 组完整的题目图片和作答图片",
                session.task_type(),
                required
            );
        }

        let step = session
            .start_grading(&self.grader, self.config.progress_interval(), |msg| {
                eprintln!("⏳ {}", msg)
            })
            .await?;

        info!("会话结束于步骤: {}", step);

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::USER_FACING_FAILURE;

    #[test]
    fn test_parse_cli_args() {
        let args = CliArgs::try_parse_from(["ket-examiner", "submission.toml", "--json"]).unwrap();
        assert_eq!(args.submission, Some(PathBuf::from("submission.toml")));
        assert_eq!(args.output_format(), OutputFormat::Json);

        let args = CliArgs::try_parse_from(["ket-examiner", "-o", "json"]).unwrap();
        assert_eq!(args.output_format(), OutputFormat::Json);

        let args = CliArgs::try_parse_from(["ket-examiner", "a.toml"]).unwrap();
        assert_eq!(args.output_format(), OutputFormat::Report);
    }

    #[test]
    fn test_parse_rejects_unknown_flag_and_extra_path() {
        assert!(CliArgs::try_parse_from(["ket-examiner", "--verbose"]).is_err());
        assert!(CliArgs::try_parse_from(["ket-examiner", "a.toml", "b.toml"]).is_err());
        assert!(CliArgs::try_parse_from(["ket-examiner", "--json", "-o", "report"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_initialize_requires_api_key() {
        assert!(App::initialize(Config::default()).is_err());
    }

    fn write_manifest(dir: &Path, body: &str) -> PathBuf {
        let manifest = dir.join("submission.toml");
        std::fs::write(&manifest, body).unwrap();
        manifest
    }

    #[tokio::test]
    async fn test_incomplete_submission_is_rejected_before_grading() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(dir.path(), "task_type = \"part6\"\n");

        let app = App::initialize(Config {
            llm_api_key: "test-key".to_string(),
            ..Config::default()
        })
        .unwrap();
        let args = CliArgs::try_parse_from(["ket-examiner", manifest.to_str().unwrap()]).unwrap();

        let err = app.run(&args).await.unwrap_err();
        assert!(err.to_string().contains("Part 6"));
    }

    #[tokio::test]
    async fn test_failed_grading_returns_user_message_only() {
        // 先占用再释放端口，保证连接被拒绝
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let dir = tempfile::tempdir().unwrap();
        let manifest = write_manifest(
            dir.path(),
            r#"
task_type = "part6"

[[tasks]]
prompt = "data:image/png;base64,AAAA"
answer = "data:image/png;base64,BBBB"
"#,
        );

        let app = App::initialize(Config {
            llm_api_key: "test-key".to_string(),
            llm_api_base_url: format!("http://127.0.0.1:{}", port),
            request_timeout_secs: 5,
            progress_interval_secs: 1,
            ..Config::default()
        })
        .unwrap();
        let args = CliArgs::try_parse_from(["ket-examiner", manifest.to_str().unwrap()]).unwrap();

        let err = app.run(&args).await.unwrap_err();
        assert_eq!(format!("{:#}", err), USER_FACING_FAILURE);
    }
}
