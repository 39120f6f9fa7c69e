//! 序列持有者
//!
//! 启动时加载一次，之后所有请求共享只读的 `Arc<Series>`。
//! 重新加载时先在锁外构建新序列，再整体替换引用。

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::DataConfig;
use crate::models::Series;

use super::normalizer::normalize;
use super::source_reader::{load_source, SourceOptions};

/// 数据源设置
#[derive(Debug, Clone)]
pub struct SourceSettings {
    pub path: PathBuf,
    pub options: SourceOptions,
    pub sort_by_date: bool,
}

impl From<&DataConfig> for SourceSettings {
    fn from(config: &DataConfig) -> Self {
        Self {
            path: PathBuf::from(&config.csv_path),
            options: SourceOptions {
                delimiter: config.delimiter,
                encoding: config.encoding.clone(),
            },
            sort_by_date: config.sort_by_date,
        }
    }
}

/// 共享序列的持有者
#[derive(Debug)]
pub struct SeriesStore {
    settings: SourceSettings,
    current: RwLock<Arc<Series>>,
}

impl SeriesStore {
    /// 读取数据源并创建持有者
    pub fn load(settings: SourceSettings) -> Self {
        let series = build_series(&settings);
        log::info!("数据序列就绪，共 {} 行", series.len());
        Self {
            settings,
            current: RwLock::new(Arc::new(series)),
        }
    }

    /// 当前序列
    pub fn get(&self) -> Arc<Series> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// 重新读取数据源并原子替换，返回新序列长度
    pub fn reload(&self) -> usize {
        let series = Arc::new(build_series(&self.settings));
        let len = series.len();
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = series;
        log::info!("重新加载数据完成，共 {} 行", len);
        len
    }
}

fn build_series(settings: &SourceSettings) -> Series {
    let table = load_source(&settings.path, &settings.options);
    normalize(&table, settings.sort_by_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn settings(path: PathBuf) -> SourceSettings {
        SourceSettings {
            path,
            options: SourceOptions::default(),
            sort_by_date: false,
        }
    }

    #[test]
    fn test_load_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "date,close\n2024-01-01,140\n2024-01-02,141\n").unwrap();

        let store = SeriesStore::load(settings(path));
        assert_eq!(store.get().len(), 2);
        assert!(Arc::ptr_eq(&store.get(), &store.get()));
    }

    #[test]
    fn test_missing_source_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SeriesStore::load(settings(dir.path().join("missing.csv")));
        assert!(store.get().is_empty());
    }

    #[test]
    fn test_reload_swaps_without_touching_old_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "date,close\n2024-01-01,140\n").unwrap();

        let store = SeriesStore::load(settings(path.clone()));
        let before = store.get();

        fs::write(&path, "date,close\n2024-01-01,140\n2024-01-02,141\n2024-01-03,142\n").unwrap();
        assert_eq!(store.reload(), 3);

        assert_eq!(before.len(), 1);
        assert_eq!(store.get().len(), 3);
    }

    #[test]
    fn test_concurrent_readers_see_whole_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "date,close\n2024-01-01,1\n2024-01-02,2\n").unwrap();

        let store = Arc::new(SeriesStore::load(settings(path)));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let len = store.get().len();
                        assert!(len == 2, "unexpected length {}", len);
                    }
                })
            })
            .collect();

        for _ in 0..10 {
            store.reload();
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
