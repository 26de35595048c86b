//! Загрузка трасс реального трафика
//!
//! Текстовая трасса: по записи `timestamp size` в строке (разделитель —
//! пробелы или запятая), строки на `#` и пустые пропускаются. Такой формат
//! даёт, например, `tshark -T fields -e frame.time_epoch -e frame.len`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::debug;

use tgen_core::{EmpiricalSample, TgenError};

use crate::error::{Result, SimError};

/// Выборки одного класса трафика
#[derive(Debug, Clone, PartialEq)]
pub struct ClassTrace {
    /// Размеры пакетов, байты
    pub sizes: Vec<u64>,
    /// Интервалы между соседними пакетами, секунды
    pub durations: Vec<f64>,
}

impl ClassTrace {
    /// Выборка размеров
    pub fn size_sample(&self) -> Result<EmpiricalSample> {
        EmpiricalSample::from_sizes(&self.sizes)
            .map_err(|e| SimError::Core(TgenError::from(e)))
    }

    /// Выборка интервалов
    pub fn duration_sample(&self) -> Result<EmpiricalSample> {
        EmpiricalSample::new(self.durations.clone())
            .map_err(|e| SimError::Core(TgenError::from(e)))
    }
}

/// Источник трассы
pub trait TraceSource {
    /// Имя источника для сообщений
    fn describe(&self) -> String;

    /// Прочитать трассу
    fn load(&self) -> Result<ClassTrace>;
}

/// Текстовая трасса на диске
#[derive(Debug, Clone)]
pub struct TextTrace {
    path: PathBuf,
    max_records: usize,
}

impl TextTrace {
    /// Трасса из файла, читается не больше `max_records` записей
    pub fn new(path: impl AsRef<Path>, max_records: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            max_records,
        }
    }

    /// Разобрать трассу из произвольного источника строк
    pub fn parse<R: BufRead>(reader: R, max_records: usize) -> Result<ClassTrace> {
        let mut sizes = Vec::new();
        let mut durations = Vec::new();
        let mut previous = 0.0;

        for (index, line) in reader.lines().enumerate() {
            if sizes.len() >= max_records {
                break;
            }
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (timestamp, size) = parse_record(line).map_err(|reason| SimError::TraceFormat {
                line: index + 1,
                reason,
            })?;

            // Первая разность (от нуля) не является интервалом
            if !sizes.is_empty() {
                durations.push(timestamp - previous);
            }
            previous = timestamp;
            sizes.push(size);
        }

        Ok(ClassTrace { sizes, durations })
    }
}

impl TraceSource for TextTrace {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<ClassTrace> {
        let file = File::open(&self.path)?;
        let trace = Self::parse(BufReader::new(file), self.max_records)?;
        if trace.durations.is_empty() {
            return Err(SimError::EmptyTrace(self.describe()));
        }
        debug!(
            "Трасса {}: {} пакетов, {} интервалов",
            self.describe(),
            trace.sizes.len(),
            trace.durations.len()
        );
        Ok(trace)
    }
}

fn parse_record(line: &str) -> std::result::Result<(f64, u64), String> {
    let mut fields = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|f| !f.is_empty());

    let (Some(timestamp), Some(size)) = (fields.next(), fields.next()) else {
        return Err("ожидается `timestamp size`".to_string());
    };
    let timestamp: f64 = timestamp
        .parse()
        .map_err(|_| format!("некорректная метка времени: {}", timestamp))?;
    if !timestamp.is_finite() {
        return Err(format!("некорректная метка времени: {}", timestamp));
    }
    let size: u64 = size
        .parse()
        .map_err(|_| format!("некорректный размер: {}", size))?;
    Ok((timestamp, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_durations_skip_first() {
        let text = "# time size\n1.0 100\n1.5 200\n\n2.25,300\n";
        let trace = TextTrace::parse(Cursor::new(text), 100).unwrap();
        assert_eq!(trace.sizes, vec![100, 200, 300]);
        assert_eq!(trace.durations, vec![0.5, 0.75]);
    }

    #[test]
    fn test_max_records() {
        let text = "0.1 10\n0.2 20\n0.3 30\n0.4 40\n";
        let trace = TextTrace::parse(Cursor::new(text), 2).unwrap();
        assert_eq!(trace.sizes, vec![10, 20]);
        assert_eq!(trace.durations.len(), 1);
    }

    #[test]
    fn test_bad_line() {
        let text = "0.1 10\nabc 20\n";
        let err = TextTrace::parse(Cursor::new(text), 10).unwrap_err();
        assert!(matches!(err, SimError::TraceFormat { line: 2, .. }));

        let err = TextTrace::parse(Cursor::new("0.5\n"), 10).unwrap_err();
        assert!(matches!(err, SimError::TraceFormat { line: 1, .. }));
    }

    #[test]
    fn test_load_file() {
        let path = std::env::temp_dir().join(format!("tgen-trace-{}.txt", std::process::id()));
        std::fs::write(&path, "0.0 64\n0.5 128\n1.0 256\n").unwrap();

        let trace = TextTrace::new(&path, 10).load().unwrap();
        assert_eq!(trace.durations, vec![0.5, 0.5]);
        let sizes = trace.size_sample().unwrap();
        assert_eq!(sizes.len(), 3);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_single_record_is_empty_trace() {
        let name = format!("tgen-trace-one-{}.txt", std::process::id());
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, "0.0 64\n").unwrap();

        let err = TextTrace::new(&path, 10).load().unwrap_err();
        assert!(matches!(err, SimError::EmptyTrace(_)));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file() {
        let err = TextTrace::new("/nonexistent/tgen/trace.txt", 10).load().unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
