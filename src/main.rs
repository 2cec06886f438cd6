//! # caconf 命令行入口
//!
//! 加载 CA 配置文档，校验全部 CA 并输出概要。
//!
//! ```text
//! caconf [--json] <配置文件> [顶层条目]
//! ```
//!
//! 环境变量：`CACONF_CONFIG`（配置文件）、`CACONF_ROOT`（相对路径根目录）、
//! `CACONF_ENGINE_DIR`（注册为 `directory` 引擎的密钥目录）、`CACONF_LOG=debug`。

use caconf::{CaConfigPool, CaConfigSummary, DEFAULT_POOL_ENTRY, DirectoryEngine, ErrorInfo, LoadOptions};
use std::collections::BTreeMap;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    let level = match std::env::var("CACONF_LOG").as_deref() {
        Ok("debug") => tracing::Level::DEBUG,
        _ => tracing::Level::INFO,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let json = take_flag(&mut args, "--json");

    let path = args
        .first()
        .cloned()
        .or_else(|| std::env::var("CACONF_CONFIG").ok())
        .ok_or("用法: caconf [--json] <配置文件> [顶层条目]")?;
    let entry = args.get(1).map(String::as_str).unwrap_or(DEFAULT_POOL_ENTRY);

    let pool = load_pool(&path, entry).map_err(|info| {
        tracing::error!("配置加载失败 [{}]: {}", info.code(), info);
        info
    })?;

    let summaries: BTreeMap<&str, CaConfigSummary> = pool
        .names()
        .into_iter()
        .filter_map(|name| pool.get(name).map(|config| (name, config.summary())))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for (name, summary) in &summaries {
            print_summary(name, summary);
        }
    }

    tracing::info!("共校验 {} 个CA", pool.len());
    Ok(())
}

/// 读取配置文档并加载配置池
fn load_pool(path: &str, entry: &str) -> error::Result<CaConfigPool> {
    let yaml = std::fs::read_to_string(path)?;
    CaConfigPool::from_yaml(entry, &yaml, &load_options()).map_err(|e| {
        let info = ErrorInfo::from(e.clone());
        let mut wrapped = ErrorInfo::with_source(info.code(), format!("加载配置文件 {} 失败", path), e)
            .with_severity(info.severity())
            .with_category(info.category());
        for context in info.context() {
            wrapped.add_context(context.clone());
        }
        wrapped
    })
}

/// 从环境变量构造加载选项
fn load_options() -> LoadOptions {
    let mut options = LoadOptions::new();

    if let Ok(root) = std::env::var("CACONF_ROOT") {
        options = options.with_root_path(root);
    }
    if let Ok(dir) = std::env::var("CACONF_ENGINE_DIR") {
        options = options.with_engine(Arc::new(DirectoryEngine::new("directory", dir)));
    }
    options
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|arg| arg != flag);
    args.len() != before
}

fn print_summary(name: &str, summary: &CaConfigSummary) {
    println!("[{}]", name);
    println!("  主题:       {}", summary.subject);
    println!("  指纹:       {}", summary.fingerprint);
    println!("  可签名:     {}", if summary.can_sign { "是" } else { "否（仅证书）" });
    if summary.ocsp_delegated {
        println!("  OCSP 委托:  {}", summary.ocsp_subject);
    }
    println!(
        "  CRL:        有效期 {}h，提前 {}s",
        summary.crl_validity_hours, summary.crl_start_skew_seconds
    );
    println!(
        "  OCSP:       有效期 {}h，提前 {}s，证书链 {} 张",
        summary.ocsp_validity_hours, summary.ocsp_start_skew_seconds, summary.ocsp_chain_length
    );
    if let Some(path) = &summary.crl_number_file {
        println!("  CRL 编号:   {}", path);
    }
    if let Some(path) = &summary.crl_list_file {
        println!("  吊销列表:   {}", path);
    }
    println!("  签发模板:   {}", summary.profiles.join(", "));
}
