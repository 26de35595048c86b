//! Марковская цепь классов трафика
//!
//! Три состояния (video, radio, game). Для каждого состояния задана строка
//! накопленных порогов `(t1, t2, 1.0)`: равномерное число `u <= t1` переводит
//! цепь в video, `u <= t2` — в radio, иначе — в game. Порядок целевых классов
//! одинаков для всех строк.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::class::TrafficClass;
use crate::error::{Result, SimError};

/// Строка таблицы переходов: накопленные пороги
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionRow {
    thresholds: [f64; 3],
}

impl TransitionRow {
    /// Строка с порогами `(t1, t2, 1.0)`
    pub const fn new(t1: f64, t2: f64) -> Self {
        Self {
            thresholds: [t1, t2, 1.0],
        }
    }

    /// Пороги строки
    pub fn thresholds(&self) -> [f64; 3] {
        self.thresholds
    }

    /// Класс, в который переводит равномерное число `u`
    pub fn target(&self, u: f64) -> TrafficClass {
        let [t1, t2, _] = self.thresholds;
        if u <= t1 {
            TrafficClass::Video
        } else if u <= t2 {
            TrafficClass::Radio
        } else {
            TrafficClass::Game
        }
    }

    /// Вероятность перехода в класс `to`
    pub fn probability(&self, to: TrafficClass) -> f64 {
        let [t1, t2, t3] = self.thresholds;
        match to {
            TrafficClass::Video => t1,
            TrafficClass::Radio => t2 - t1,
            TrafficClass::Game => t3 - t2,
        }
    }

    /// Проверка монотонности порогов
    pub fn validate(&self, class: TrafficClass) -> Result<()> {
        let [t1, t2, t3] = self.thresholds;
        let reason = if self.thresholds.iter().any(|t| !t.is_finite()) {
            Some("пороги должны быть конечными числами".to_string())
        } else if t1 < 0.0 {
            Some(format!("t1 = {} < 0", t1))
        } else if t1 > t2 {
            Some(format!("t1 = {} > t2 = {}", t1, t2))
        } else if t2 > t3 {
            Some(format!("t2 = {} > t3 = {}", t2, t3))
        } else if t3 != 1.0 {
            Some(format!("последний порог должен быть 1.0, получено {}", t3))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SimError::InvalidTransition { class, reason }),
            None => Ok(()),
        }
    }
}

/// Таблица переходов: по строке на класс
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionTable {
    /// Переходы из video
    pub video: TransitionRow,
    /// Переходы из radio
    pub radio: TransitionRow,
    /// Переходы из game
    pub game: TransitionRow,
}

impl TransitionTable {
    /// Строка таблицы для класса
    pub fn row(&self, class: TrafficClass) -> &TransitionRow {
        match class {
            TrafficClass::Video => &self.video,
            TrafficClass::Radio => &self.radio,
            TrafficClass::Game => &self.game,
        }
    }

    /// Проверка всех строк
    pub fn validate(&self) -> Result<()> {
        for class in TrafficClass::ALL {
            self.row(class).validate(class)?;
        }
        Ok(())
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self {
            video: TransitionRow::new(0.2, 0.475),
            radio: TransitionRow::new(0.3, 0.7),
            game: TransitionRow::new(0.25, 0.5375),
        }
    }
}

/// Марковская цепь классов трафика
#[derive(Debug, Clone)]
pub struct MarkovChain {
    table: TransitionTable,
    current: TrafficClass,
}

impl MarkovChain {
    /// Создать цепь с заданным начальным состоянием
    pub fn new(table: TransitionTable, start: TrafficClass) -> Result<Self> {
        table.validate()?;
        Ok(Self {
            table,
            current: start,
        })
    }

    /// Создать цепь со случайным (равновероятным) начальным состоянием
    pub fn with_random_start<R: Rng + ?Sized>(table: TransitionTable, rng: &mut R) -> Result<Self> {
        let start = TrafficClass::ALL[rng.gen_range(0..TrafficClass::ALL.len())];
        Self::new(table, start)
    }

    /// Текущее состояние
    pub fn current_state(&self) -> TrafficClass {
        self.current
    }

    /// Таблица переходов
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Сделать переход, взяв равномерное число из `rng`
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TrafficClass {
        let u: f64 = rng.gen();
        self.advance_with(u)
    }

    /// Сделать переход по заданному равномерному числу `u`
    pub fn advance_with(&mut self, u: f64) -> TrafficClass {
        self.current = self.table.row(self.current).target(u);
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_table_is_valid() {
        assert!(TransitionTable::default().validate().is_ok());
    }

    #[test]
    fn test_row_probabilities() {
        let row = *TransitionTable::default().row(TrafficClass::Video);
        assert_eq!(row.thresholds(), [0.2, 0.475, 1.0]);
        assert!((row.probability(TrafficClass::Radio) - 0.275).abs() < 1e-12);
        assert!((row.probability(TrafficClass::Game) - 0.525).abs() < 1e-12);

        let total: f64 = TrafficClass::ALL.iter().map(|c| row.probability(*c)).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_target_boundaries() {
        let row = TransitionRow::new(0.3, 0.7);
        assert_eq!(row.target(0.0), TrafficClass::Video);
        assert_eq!(row.target(0.3), TrafficClass::Video);
        assert_eq!(row.target(0.300_001), TrafficClass::Radio);
        assert_eq!(row.target(0.7), TrafficClass::Radio);
        assert_eq!(row.target(0.71), TrafficClass::Game);
        assert_eq!(row.target(1.0), TrafficClass::Game);
    }

    #[test]
    fn test_invalid_rows() {
        let table = TransitionTable {
            radio: TransitionRow::new(0.8, 0.4),
            ..TransitionTable::default()
        };
        assert!(matches!(
            table.validate(),
            Err(SimError::InvalidTransition {
                class: TrafficClass::Radio,
                ..
            })
        ));

        let row = TransitionRow::new(-0.1, 0.5);
        assert!(row.validate(TrafficClass::Video).is_err());

        let row = TransitionRow::new(0.1, 1.5);
        assert!(row.validate(TrafficClass::Game).is_err());

        assert!(MarkovChain::new(table, TrafficClass::Video).is_err());
    }

    #[test]
    fn test_fixed_draws_are_deterministic() {
        let draws = [0.1, 0.5, 0.65, 0.9, 0.26, 0.3, 0.0, 0.48, 0.99, 0.2];
        let expected = [
            TrafficClass::Video, // из video: 0.1 <= 0.2
            TrafficClass::Game,  // из video: 0.5 > 0.475
            TrafficClass::Game,  // из game: 0.65 > 0.5375
            TrafficClass::Game,
            TrafficClass::Radio, // из game: 0.25 < 0.26 <= 0.5375
            TrafficClass::Video, // из radio: 0.3 <= 0.3
            TrafficClass::Video,
            TrafficClass::Game,
            TrafficClass::Game,
            TrafficClass::Video, // из game: 0.2 <= 0.25
        ];

        let mut chain = MarkovChain::new(TransitionTable::default(), TrafficClass::Video).unwrap();
        let visited: Vec<TrafficClass> = draws.iter().map(|&u| chain.advance_with(u)).collect();
        assert_eq!(visited, expected);
        assert_eq!(chain.current_state(), TrafficClass::Video);
    }

    #[test]
    fn test_random_start_covers_all_classes() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 3];
        for _ in 0..100 {
            let chain =
                MarkovChain::with_random_start(TransitionTable::default(), &mut rng).unwrap();
            seen[chain.current_state().index()] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_empirical_frequencies() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut chain = MarkovChain::new(TransitionTable::default(), TrafficClass::Radio).unwrap();
        let mut from_radio = [0usize; 3];
        let mut total = 0usize;
        for _ in 0..20_000 {
            let before = chain.current_state();
            let after = chain.advance(&mut rng);
            if before == TrafficClass::Radio {
                from_radio[after.index()] += 1;
                total += 1;
            }
        }
        let row = TransitionRow::new(0.3, 0.7);
        for class in TrafficClass::ALL {
            let freq = from_radio[class.index()] as f64 / total as f64;
            assert!((freq - row.probability(class)).abs() < 0.03, "{}: {}", class, freq);
        }
    }
}
