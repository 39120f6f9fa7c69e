//! 图表渲染
//!
//! 以折线加标记点绘制完整序列，输出内存中的 PNG 字节，不写磁盘

use std::ops::Range;

use chrono::{DateTime, Duration, TimeZone, Utc};
use image::{codecs::png::PngEncoder, ColorType, ImageEncoder};
use plotters::prelude::*;

use crate::config::ChartConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::models::Series;

/// 图表渲染能力，返回 PNG 字节
pub trait ChartRenderer: Send + Sync {
    fn render(&self, series: &Series) -> PipelineResult<Vec<u8>>;
}

/// 图表参数
#[derive(Debug, Clone)]
pub struct ChartSettings {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// 数据点超过该数量时旋转 X 轴刻度
    pub rotate_labels_over: usize,
}

impl From<&ChartConfig> for ChartSettings {
    fn from(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            title: config.title.clone(),
            x_label: config.x_label.clone(),
            y_label: config.y_label.clone(),
            rotate_labels_over: config.rotate_labels_over,
        }
    }
}

/// 基于 plotters 位图后端的渲染器
#[derive(Debug, Clone)]
pub struct PlottersChartRenderer {
    settings: ChartSettings,
}

impl PlottersChartRenderer {
    pub fn new(settings: ChartSettings) -> Self {
        Self { settings }
    }

    /// 数据点过多时旋转 X 轴刻度标签
    fn rotates_labels(&self, point_count: usize) -> bool {
        point_count > self.settings.rotate_labels_over
    }

    /// 在 RGB 缓冲区上绘制
    fn draw(&self, points: &[(DateTime<Utc>, f64)], buffer: &mut [u8]) -> PipelineResult<()> {
        let (x_range, y_range, y_scale) = axis_ranges(points)?;
        let rotate = self.rotates_labels(points.len());
        let points: Vec<(DateTime<Utc>, f64)> = points.iter().map(|&(x, y)| (x, y * y_scale)).collect();
        let y_desc = if y_scale == 1.0 {
            self.settings.y_label.clone()
        } else {
            format!("{} (×{:e})", self.settings.y_label, 1.0 / y_scale)
        };

        let root = BitMapBackend::with_buffer(buffer, (self.settings.width, self.settings.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.settings.title, ("sans-serif", 28).into_font())
            .margin(15)
            .x_label_area_size(if rotate { 100 } else { 40 })
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(render_error)?;

        let x_label_style: TextStyle = if rotate {
            ("sans-serif", 13).into_font().transform(FontTransform::Rotate90).into()
        } else {
            ("sans-serif", 13).into_font().into()
        };

        chart
            .configure_mesh()
            .x_desc(self.settings.x_label.as_str())
            .y_desc(y_desc.as_str())
            .x_labels(points.len().min(10))
            .x_label_style(x_label_style)
            .x_label_formatter(&|d: &DateTime<Utc>| d.format("%Y-%m-%d").to_string())
            .draw()
            .map_err(render_error)?;

        // 单个数据点只画标记
        if points.len() > 1 {
            chart
                .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
                .map_err(render_error)?;
        }
        chart
            .draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
        Ok(())
    }
}

impl ChartRenderer for PlottersChartRenderer {
    fn render(&self, series: &Series) -> PipelineResult<Vec<u8>> {
        if series.is_empty() {
            return Err(PipelineError::Render("空序列无法绘制图表".to_string()));
        }

        let points: Vec<(DateTime<Utc>, f64)> = series
            .rows()
            .iter()
            .map(|row| (Utc.from_utc_datetime(&row.date), row.close))
            .collect();

        let (width, height) = (self.settings.width, self.settings.height);
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        self.draw(&points, &mut buffer)?;

        let mut png = Vec::new();
        PngEncoder::new(&mut png)
            .write_image(&buffer, width, height, ColorType::Rgb8)
            .map_err(render_error)?;

        log::debug!("图表渲染完成: {} 个数据点, {} 字节", points.len(), png.len());
        Ok(png)
    }
}

/// 超大数值无法得到有限坐标范围时使用的缩放系数
const LARGE_VALUE_SCALE: f64 = 1e-10;

/// 计算坐标轴范围；单点或水平线时补齐宽度
///
/// 返回 (X 范围, 缩放后的 Y 范围, Y 缩放系数)。Y 范围两端与宽度都保证有限。
fn axis_ranges(
    points: &[(DateTime<Utc>, f64)],
) -> PipelineResult<(Range<DateTime<Utc>>, Range<f64>, f64)> {
    let (Some(x_min), Some(x_max)) = (
        points.iter().map(|p| p.0).min(),
        points.iter().map(|p| p.0).max(),
    ) else {
        return Err(PipelineError::Render("没有可绘制的数据点".to_string()));
    };

    let (x_min, x_max) = if x_min == x_max {
        (x_min - Duration::days(1), x_max + Duration::days(1))
    } else {
        (x_min, x_max)
    };

    let (y_range, y_scale) = [1.0, LARGE_VALUE_SCALE]
        .into_iter()
        .find_map(|scale| padded_range(points, scale).map(|range| (range, scale)))
        .ok_or_else(|| PipelineError::Render("收盘价超出可绘制范围".to_string()))?;

    Ok((x_min..x_max, y_range, y_scale))
}

/// 按比例缩放后加边距；任何一端或宽度溢出时返回 None
fn padded_range(points: &[(DateTime<Utc>, f64)], scale: f64) -> Option<Range<f64>> {
    let y_min = points.iter().map(|p| p.1 * scale).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|p| p.1 * scale).fold(f64::NEG_INFINITY, f64::max);
    let spread = y_max - y_min;
    let padding = if spread > 0.0 {
        spread * 0.1
    } else {
        (y_max.abs() * 0.05).max(1.0)
    };

    let (low, high) = (y_min - padding, y_max + padding);
    let finite = low.is_finite() && high.is_finite() && (high - low).is_finite();
    (finite && low < high).then(|| low..high)
}

fn render_error<E: std::fmt::Display>(e: E) -> PipelineError {
    PipelineError::Render(e.to_string())
}
