use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::{Args, Parser, Subcommand};
use scheduler_core::{init_logging, ConsoleConfig, LogFormat, LogLevel};
use scheduler_cron::{describe, preview, INVALID_DESCRIPTION};
use scheduler_stream::{ConnectionState, ExecutionMonitor, JobLogId, SseChannel};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

mod render;

/// 控制台应用程序主结构
#[derive(Parser, Debug)]
#[command(name = "scheduler-console")]
#[command(version = "1.0.0")]
#[command(about = "定时任务调度预览与执行日志监控")]
struct CliApp {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long, value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: Option<String>,

    /// 日志格式
    #[arg(long, value_parser = ["json", "pretty", "compact"])]
    log_format: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 预览CRON表达式接下来的执行时间
    Preview(PreviewArgs),
    /// 输出CRON表达式的可读描述
    Describe {
        /// CRON表达式（5个字段，或以0开头的6个字段）
        expression: String,
    },
    /// 实时查看某次执行的步骤日志
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct PreviewArgs {
    /// CRON表达式（5个字段，或以0开头的6个字段）
    expression: String,

    /// 预览次数，默认取配置值
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// 起始时间（RFC 3339），默认当前时间
    #[arg(long)]
    from: Option<String>,

    /// 以JSON格式输出
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct WatchArgs {
    /// 执行日志ID
    job_log_id: JobLogId,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = CliApp::parse();

    let mut config = ConsoleConfig::load(cli.config.as_deref()).context("加载配置失败")?;
    if let Some(level) = &cli.log_level {
        config.logging.level = level.parse::<LogLevel>()?;
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.parse::<LogFormat>()?;
    }
    init_logging(&config.logging)?;

    match cli.command {
        Commands::Preview(args) => run_preview(args, &config),
        Commands::Describe { expression } => {
            println!("{}", describe(&expression));
            Ok(())
        }
        Commands::Watch(args) => run_watch(args, &config).await,
    }
}

fn run_preview(args: PreviewArgs, config: &ConsoleConfig) -> Result<()> {
    let count = args.count.unwrap_or(config.preview.count);
    let from: DateTime<Local> = match &args.from {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("无法解析起始时间: {text}"))?
            .with_timezone(&Local),
        None => Local::now(),
    };

    let preview = match preview(&args.expression, &from, count) {
        Ok(preview) => preview,
        Err(err) => {
            println!("{INVALID_DESCRIPTION}");
            return Err(err).context("预览失败");
        }
    };

    for field in &preview.unsupported_fields {
        warn!(field = field.name(), "字段使用了 a/n 形式的步长，预览中不会匹配");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&render::preview_json(&preview))?);
    } else {
        print!("{}", render::preview_text(&preview));
    }
    Ok(())
}

async fn run_watch(args: WatchArgs, config: &ConsoleConfig) -> Result<()> {
    let channel = SseChannel::new(config.api.clone())?;
    info!(job_log_id = args.job_log_id, url = %channel.stream_url(args.job_log_id), "开始监控执行日志");

    let mut monitor = ExecutionMonitor::new(channel)
        .on_complete(|session| {
            let summary = session.summary();
            info!(
                total = summary.total,
                success = summary.success,
                failed = summary.failed,
                "执行结束"
            );
        })
        .on_error(|err| warn!(error = %err, "执行日志通道异常"));
    monitor.open(args.job_log_id).await;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut rendered = None;

    loop {
        let view = monitor.view();
        if rendered.as_ref() != Some(&view) {
            print!("{}", render::view_text(&view));
            rendered = Some(view);
        }

        if monitor.is_complete() {
            break;
        }

        if monitor.state() == ConnectionState::Closed {
            println!("连接已断开，按回车重新连接，Ctrl+C 退出");
            let retry = tokio::select! {
                line = stdin.next_line() => matches!(line, Ok(Some(_))),
                _ = &mut ctrl_c => false,
            };
            if !retry {
                break;
            }
            monitor.reconnect().await;
            continue;
        }

        let interrupted = tokio::select! {
            _ = monitor.pump() => false,
            _ = &mut ctrl_c => true,
        };
        if interrupted {
            info!("收到中断信号，关闭订阅");
            monitor.close();
            break;
        }
    }

    Ok(())
}
