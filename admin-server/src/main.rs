use admin_server::{Config, Server, init_logger, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 读取 .env (不存在时忽略)
    let _ = dotenvy::dotenv();

    // 2. 加载配置
    let config = Config::from_env()?;

    // 3. 日志 (guard 需存活到进程结束，否则文件日志丢失)
    let _guard = init_logger(
        &config.log_level,
        config.log_json,
        config.log_dir.as_deref(),
    )?;

    // 打印横幅
    print_banner();

    tracing::info!(
        environment = %config.environment,
        database = %config.database_url,
        path_match = %config.path_match,
        "Admin server starting..."
    );

    // 4. 初始化状态并启动 HTTP 服务器
    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
