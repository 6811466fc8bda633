//! Work/play balance aggregates for the home screen scale.

use crate::model::task::{Task, TaskType};

/// Which side of the scale is heavier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tilt {
    Work,
    Play,
    Level,
}

/// Priority sums grouped by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balance {
    pub work_sum: u32,
    pub play_sum: u32,
    pub work_count: u32,
    pub play_count: u32,
}

impl Balance {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut acc, task| {
            let weight = u32::from(task.priority.get());
            match task.kind {
                TaskType::Work => {
                    acc.work_sum += weight;
                    acc.work_count += 1;
                }
                TaskType::Play => {
                    acc.play_sum += weight;
                    acc.play_count += 1;
                }
            }
            acc
        })
    }

    pub fn total(&self) -> u32 {
        self.work_sum + self.play_sum
    }

    /// Work share of the total weight; `0.0` for an empty board.
    pub fn work_ratio(&self) -> f64 {
        f64::from(self.work_sum) / f64::from(self.total().max(1))
    }

    /// Play share of the total weight; `0.0` for an empty board.
    pub fn play_ratio(&self) -> f64 {
        f64::from(self.play_sum) / f64::from(self.total().max(1))
    }

    pub fn tilt(&self) -> Tilt {
        match self.work_sum.cmp(&self.play_sum) {
            std::cmp::Ordering::Greater => Tilt::Work,
            std::cmp::Ordering::Less => Tilt::Play,
            std::cmp::Ordering::Equal => Tilt::Level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Balance, Tilt};
    use crate::model::task::{Priority, Task, TaskType};
    use chrono::Utc;

    fn task(kind: TaskType, priority: u8) -> Task {
        Task::new("t", kind, Priority::new(priority).unwrap(), Utc::now()).unwrap()
    }

    #[test]
    fn sums_priorities_per_category() {
        let tasks = vec![
            task(TaskType::Work, 4),
            task(TaskType::Play, 2),
            task(TaskType::Work, 5),
        ];
        let balance = Balance::from_tasks(&tasks);

        assert_eq!(balance.work_sum, 9);
        assert_eq!(balance.play_sum, 2);
        assert_eq!(balance.work_count, 2);
        assert_eq!(balance.play_count, 1);
        assert_eq!(balance.tilt(), Tilt::Work);
        assert!((balance.work_ratio() - 9.0 / 11.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_board_is_level_with_zero_ratios() {
        let balance = Balance::from_tasks(&[]);
        assert_eq!(balance, Balance::default());
        assert_eq!(balance.tilt(), Tilt::Level);
        assert_eq!(balance.work_ratio(), 0.0);
        assert_eq!(balance.play_ratio(), 0.0);
    }
}
