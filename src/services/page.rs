//! 页面组装
//!
//! 每个请求执行一次：空序列直接返回提示；否则依次选取窗口、渲染表格、
//! 绘制图表并编码，拼成完整 HTML 文档。图表失败不会降级为仅表格页面。

use crate::config::AppConfig;
use crate::error::PipelineResult;
use crate::models::{RenderedPage, Series};

use super::chart::ChartRenderer;
use super::encoder::png_data_uri;
use super::table::{escape_html, render_table};
use super::window::select_window;

/// 页面文案与窗口大小
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub title: String,
    pub latest_heading: String,
    pub chart_heading: String,
    pub no_data_message: String,
    pub window_size: usize,
}

impl From<&AppConfig> for PageSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            title: config.page.title.clone(),
            latest_heading: config.page.latest_heading.clone(),
            chart_heading: config.page.chart_heading.clone(),
            no_data_message: config.page.no_data_message.clone(),
            window_size: config.data.window_size,
        }
    }
}

/// 页面组装器
pub struct PageComposer {
    renderer: Box<dyn ChartRenderer>,
    settings: PageSettings,
}

impl PageComposer {
    pub fn new(renderer: Box<dyn ChartRenderer>, settings: PageSettings) -> Self {
        Self { renderer, settings }
    }

    /// 无数据时的固定提示片段
    pub fn no_data_page(&self) -> RenderedPage {
        RenderedPage::new(format!("<h2>{}</h2>", escape_html(&self.settings.no_data_message)))
    }

    /// 组装页面
    ///
    /// # 参数
    /// - series: 当前加载的完整序列
    pub fn compose(&self, series: &Series) -> PipelineResult<RenderedPage> {
        if series.is_empty() {
            return Ok(self.no_data_page());
        }

        let window = select_window(series, self.settings.window_size);
        let table_html = render_table(&window);
        log::debug!("表格 {} 行，图表 {} 个数据点", window.len(), series.len());

        let png = self.renderer.render(series)?;
        let chart_uri = png_data_uri(&png);

        let title = escape_html(&self.settings.title);
        let chart_heading = escape_html(&self.settings.chart_heading);
        let html = format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head>\n\
             <meta charset=\"utf-8\">\n\
             <title>{title}</title>\n\
             </head>\n\
             <body>\n\
             <h1>{latest}</h1>\n\
             {table_html}\n\
             <h2>{chart_heading}</h2>\n\
             <img src=\"{chart_uri}\" alt=\"{chart_heading}\">\n\
             </body>\n\
             </html>\n",
            latest = escape_html(&self.settings.latest_heading),
        );

        Ok(RenderedPage::new(html))
    }
}
