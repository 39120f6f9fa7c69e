//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，并允许环境变量覆盖部分字段

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// 数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// CSV 文件路径
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    /// 字段分隔符
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// 文件编码（WHATWG 标签，如 utf-8、shift_jis）
    #[serde(default = "default_encoding")]
    pub encoding: String,
    /// 表格展示的最近行数
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// 是否按日期排序（默认保持文件顺序）
    #[serde(default)]
    pub sort_by_date: bool,
    /// 每次请求前重新加载数据文件
    #[serde(default)]
    pub reload_on_request: bool,
}

/// 图表配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,
    #[serde(default = "default_chart_height")]
    pub height: u32,
    /// 图表标题
    #[serde(default = "default_chart_title")]
    pub title: String,
    #[serde(default = "default_x_label")]
    pub x_label: String,
    #[serde(default = "default_y_label")]
    pub y_label: String,
    /// 数据点超过该数量时旋转 X 轴刻度标签
    #[serde(default = "default_rotate_labels_over")]
    pub rotate_labels_over: usize,
}

/// 页面文案配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_page_title")]
    pub title: String,
    /// 最新数据标题
    #[serde(default = "default_latest_heading")]
    pub latest_heading: String,
    /// 图表标题
    #[serde(default = "default_chart_heading")]
    pub chart_heading: String,
    /// 无数据时返回的提示
    #[serde(default = "default_no_data_message")]
    pub no_data_message: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据源配置
    #[serde(default)]
    pub data: DataConfig,
    /// 图表配置
    #[serde(default)]
    pub chart: ChartConfig,
    /// 页面配置
    #[serde(default)]
    pub page: PageConfig,
}

/// 图表宽高上限（像素）
pub const MAX_CHART_DIMENSION: u32 = 4096;

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 5000 }
fn default_csv_path() -> String { "usd_jpy_features.csv".to_string() }
fn default_delimiter() -> char { ',' }
fn default_encoding() -> String { "utf-8".to_string() }
pub(crate) fn default_window_size() -> usize { 10 }
fn default_chart_width() -> u32 { 1000 }
fn default_chart_height() -> u32 { 500 }
fn default_chart_title() -> String { "USD/JPY Close".to_string() }
fn default_x_label() -> String { "date".to_string() }
fn default_y_label() -> String { "close".to_string() }
fn default_rotate_labels_over() -> usize { 8 }
fn default_page_title() -> String { "USD/JPY".to_string() }
fn default_latest_heading() -> String { "USD/JPY 最新データ".to_string() }
fn default_chart_heading() -> String { "USD/JPY チャート".to_string() }
fn default_no_data_message() -> String { "USD/JPYデータがありません".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            delimiter: default_delimiter(),
            encoding: default_encoding(),
            window_size: default_window_size(),
            sort_by_date: false,
            reload_on_request: false,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            title: default_chart_title(),
            x_label: default_x_label(),
            y_label: default_y_label(),
            rotate_labels_over: default_rotate_labels_over(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            title: default_page_title(),
            latest_heading: default_latest_heading(),
            chart_heading: default_chart_heading(),
            no_data_message: default_no_data_message(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config.validated())
    }

    /// 加载配置，优先从文件，失败则使用默认值；最后应用环境变量覆盖
    pub fn load() -> Self {
        let mut config_paths: Vec<String> = Vec::new();
        if let Ok(path) = env::var("APP_CONFIG") {
            config_paths.push(path);
        }
        config_paths.push("config.json".to_string());
        config_paths.push("config/config.json".to_string());

        let mut loaded = None;
        for path in &config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        loaded = Some(config);
                        break;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        let mut config = loaded.unwrap_or_else(|| {
            log::info!("使用默认配置");
            Self::default()
        });
        config.apply_env_overrides(|key| env::var(key).ok());
        config
    }

    /// 应用环境变量覆盖（CSV_PATH、HOST、PORT）
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("CSV_PATH") {
            self.data.csv_path = path;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(e) => log::warn!("忽略无效的 PORT 环境变量 '{}': {}", port, e),
            }
        }
    }

    /// 修正不合法的取值
    fn validated(mut self) -> Self {
        if self.data.window_size == 0 {
            log::warn!("window_size 不能为 0，使用默认值 {}", default_window_size());
            self.data.window_size = default_window_size();
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            log::warn!("图表尺寸无效，使用默认尺寸");
            self.chart.width = default_chart_width();
            self.chart.height = default_chart_height();
        }
        if self.chart.width > MAX_CHART_DIMENSION || self.chart.height > MAX_CHART_DIMENSION {
            log::warn!(
                "图表尺寸 {}x{} 超过上限 {}，按上限截断",
                self.chart.width,
                self.chart.height,
                MAX_CHART_DIMENSION
            );
            self.chart.width = self.chart.width.min(MAX_CHART_DIMENSION);
            self.chart.height = self.chart.height.min(MAX_CHART_DIMENSION);
        }
        self
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
