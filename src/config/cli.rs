use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "mybeerlog")]
#[command(about = "Brewery check-in backend: local development tool")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// 計算兩點間距離（公尺）
    Distance {
        #[arg(allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(allow_hyphen_values = true)]
        from_lng: f64,
        #[arg(allow_hyphen_values = true)]
        to_lat: f64,
        #[arg(allow_hyphen_values = true)]
        to_lng: f64,
    },

    /// 對設定檔中的釀酒廠執行一次打卡
    CheckIn {
        #[arg(short, long, default_value = "mybeerlog.toml")]
        config: PathBuf,

        #[arg(long)]
        user: i64,

        #[arg(long)]
        brewery: i64,

        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },

    /// 逐行讀取 JSON 事件並依序處理（共用同一份記憶體狀態）
    Replay {
        #[arg(short, long, default_value = "mybeerlog.toml")]
        config: PathBuf,

        /// 事件檔（JSON Lines）；未指定時讀 stdin
        #[arg(short, long)]
        events: Option<PathBuf>,
    },
}
