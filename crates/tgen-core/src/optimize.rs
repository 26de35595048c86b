//! Симплекс-метод Нелдера–Мида для минимизации без производных
//!
//! Используется для оценки максимального правдоподобия там, где нет
//! замкнутой формулы. Критерии остановки: разброс значений в симплексе
//! не больше `ftol` и разброс вершин не больше `xtol`, либо исчерпан
//! лимит итераций/вычислений.

/// Настройки оптимизатора
#[derive(Debug, Clone, Copy)]
pub struct NelderMead {
    /// Допуск по аргументу
    pub xtol: f64,
    /// Допуск по значению функции
    pub ftol: f64,
    /// Итераций на одну размерность
    pub iterations_per_dim: usize,
}

/// Результат минимизации
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Лучшая найденная точка
    pub point: Vec<f64>,
    /// Значение функции в ней
    pub value: f64,
    /// Выполнено итераций
    pub iterations: usize,
    /// Достигнуты ли допуски
    pub converged: bool,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self {
            xtol: 1e-4,
            ftol: 1e-4,
            iterations_per_dim: 200,
        }
    }
}

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

impl NelderMead {
    /// Минимизировать `f`, начиная с `x0`
    ///
    /// NaN в значениях функции трактуется как +inf.
    pub fn minimize<F>(&self, mut f: F, x0: &[f64]) -> Minimum
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = x0.len();
        let max_iter = self.iterations_per_dim * n.max(1);
        let max_evals = max_iter;

        let mut eval = |x: &[f64]| {
            let v = f(x);
            if v.is_nan() {
                f64::INFINITY
            } else {
                v
            }
        };

        // Начальный симплекс: сдвиг на 5% по каждой координате
        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(x0.to_vec());
        for k in 0..n {
            let mut vertex = x0.to_vec();
            vertex[k] = if vertex[k] != 0.0 {
                1.05 * vertex[k]
            } else {
                0.00025
            };
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|x| eval(x)).collect();
        let mut evals = n + 1;
        let mut iterations = 0;
        let mut converged = false;

        while evals < max_evals && iterations < max_iter {
            order(&mut simplex, &mut values);

            let f_spread = values[1..]
                .iter()
                .map(|v| (v - values[0]).abs())
                .fold(0.0, f64::max);
            let x_spread = simplex[1..]
                .iter()
                .flat_map(|x| x.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
                .fold(0.0, f64::max);
            if values[n].is_finite() && f_spread <= self.ftol && x_spread <= self.xtol {
                converged = true;
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|k| simplex[..n].iter().map(|x| x[k]).sum::<f64>() / n as f64)
                .collect();
            let worst = &simplex[n];
            let along = |t: f64| -> Vec<f64> {
                centroid
                    .iter()
                    .zip(worst)
                    .map(|(c, w)| c + t * (c - w))
                    .collect()
            };

            let reflected = along(REFLECT);
            let f_reflected = eval(&reflected);
            evals += 1;

            if f_reflected < values[0] {
                let expanded = along(REFLECT * EXPAND);
                let f_expanded = eval(&expanded);
                evals += 1;
                if f_expanded < f_reflected {
                    simplex[n] = expanded;
                    values[n] = f_expanded;
                } else {
                    simplex[n] = reflected;
                    values[n] = f_reflected;
                }
                continue;
            }

            if f_reflected < values[n - 1] {
                simplex[n] = reflected;
                values[n] = f_reflected;
                continue;
            }

            let (contracted, outside) = if f_reflected < values[n] {
                (along(REFLECT * CONTRACT), true)
            } else {
                (along(-CONTRACT), false)
            };
            let f_contracted = eval(&contracted);
            evals += 1;

            let accept = if outside {
                f_contracted <= f_reflected
            } else {
                f_contracted <= values[n]
            };
            if accept {
                simplex[n] = contracted;
                values[n] = f_contracted;
                continue;
            }

            // Сжатие всего симплекса к лучшей вершине
            let best = simplex[0].clone();
            for j in 1..=n {
                for k in 0..n {
                    simplex[j][k] = best[k] + SHRINK * (simplex[j][k] - best[k]);
                }
                values[j] = eval(&simplex[j]);
            }
            evals += n;
        }

        order(&mut simplex, &mut values);
        Minimum {
            point: simplex.swap_remove(0),
            value: values[0],
            iterations,
            converged,
        }
    }
}

/// Упорядочить вершины по возрастанию значения функции
fn order(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = idx.iter().map(|&i| simplex[i].clone()).collect();
    *values = idx.iter().map(|&i| values[i]).collect();
}
