use lab_monitor::{AppState, SessionTicker, console, print_banner, setup_environment};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment();

    print_banner();
    tracing::info!(work_dir = %config.work_dir, "Game Lab Monitor starting...");

    // 2. 加载持久化状态
    let state = AppState::initialize(&config);

    // 3. 启动倒计时
    let ticker = SessionTicker::start(state.clone());

    // 4. Ctrl-C 关闭
    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, shutting down");
            ctrl_c.cancel();
        }
    });

    // 5. 控制台
    let result = console::run(state, shutdown).await;

    ticker.stop().await;
    tracing::info!("Game Lab Monitor stopped");

    result?;
    Ok(())
}
