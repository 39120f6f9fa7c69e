//! 窗口选择

use crate::models::{Series, Window};

/// 取序列末尾 min(n, len) 行，保持原有顺序；空序列得到空窗口
pub fn select_window(series: &Series, n: usize) -> Window<'_> {
    series.tail(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeriesRow;
    use chrono::NaiveDate;

    fn series(len: usize) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Series::new(
            (0..len)
                .map(|i| SeriesRow {
                    date: (start + chrono::Duration::days(i as i64)).and_hms_opt(0, 0, 0).unwrap(),
                    close: 100.0 + i as f64,
                })
                .collect(),
        )
    }

    #[test]
    fn test_window_sizes() {
        for (len, n) in [(15, 10), (3, 10), (10, 10), (1, 1), (5, 1), (0, 10)] {
            let s = series(len);
            let window = select_window(&s, n);

            assert_eq!(window.len(), n.min(len), "len={} n={}", len, n);
            if len > 0 {
                assert_eq!(window.rows().last(), s.rows().last());
                assert_eq!(window.rows(), &s.rows()[len - window.len()..]);
            }
        }
    }

    #[test]
    fn test_window_of_fifteen_starts_at_row_six() {
        let s = series(15);
        let window = select_window(&s, 10);
        assert_eq!(window.rows()[0], s.rows()[5]);
        assert_eq!(window.rows()[0].close, 105.0);
    }

    #[test]
    fn test_zero_window_is_empty() {
        let s = series(4);
        assert!(select_window(&s, 0).is_empty());
    }

    #[test]
    fn test_window_does_not_mutate_series() {
        let s = series(12);
        let before = s.clone();
        let _ = select_window(&s, 3);
        assert_eq!(s, before);
    }
}
