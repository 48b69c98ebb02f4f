//! Echelon 命令行入口
//!
//! 用法：`echelon <指令...> [--guest | --user <id>] [--mock] [--config <FILE>]`
//! 初始化日志、加载配置、构建标准编制并打印最终报告。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use echelon::context::AppContext;
use echelon::hierarchy::build_coordinator;
use echelon::llm::{BackendFactory, FixedBackendFactory, ModelRouter, OpenAiBackendFactory, RoutingSettings};
use echelon::observability;
use echelon::tools::sample_registry;

#[derive(Parser, Debug)]
#[command(name = "echelon")]
#[command(version, about = "Hierarchical task delegation engine", long_about = None)]
struct Args {
    /// 自然语言指令（多个词按空格拼接）
    #[arg(required = true, value_name = "ORDER")]
    order: Vec<String>,

    /// 以访客身份执行
    #[arg(long, conflicts_with = "user")]
    guest: bool,

    /// 以指定用户身份执行
    #[arg(long, value_name = "ID")]
    user: Option<String>,

    /// 使用内置 mock 后端，不访问任何模型服务
    #[arg(long)]
    mock: bool,

    /// 配置文件路径（无法解析时回退到默认路由阈值）
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    fn order_text(&self) -> String {
        self.order.join(" ")
    }

    fn context(&self) -> AppContext {
        match (self.guest, &self.user) {
            (true, _) => AppContext::guest(),
            (false, Some(id)) => AppContext::user(id.clone()),
            (false, None) => AppContext::default(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    observability::init();

    let settings = RoutingSettings::load_from(args.config.clone());
    tracing::info!("echelon starting (token threshold {})", settings.token_threshold);

    let factory: Arc<dyn BackendFactory> = if args.mock {
        Arc::new(FixedBackendFactory::mock())
    } else {
        Arc::new(OpenAiBackendFactory)
    };
    let router = Arc::new(ModelRouter::new(settings, factory));

    let tools = sample_registry();
    let coordinator = build_coordinator(&tools, router).context("Failed to build hierarchy")?;

    let outcome = coordinator
        .handle(&args.order_text(), &args.context(), &[])
        .await;
    println!("{}", outcome.final_report);
    if let Some(e) = outcome.error {
        tracing::warn!("Order finished with error: {}", e);
    }
    Ok(())
}
