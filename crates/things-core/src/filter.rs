use crate::todo::TaskItem;

/// Exact-match area/project constraint. Both must match when both are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerFilter {
    pub area: Option<String>,
    pub project: Option<String>,
}

impl ContainerFilter {
    /// Empty or blank strings mean "no constraint".
    pub fn new(area: Option<&str>, project: Option<&str>) -> Self {
        Self {
            area: non_blank(area),
            project: non_blank(project),
        }
    }

    fn is_empty(&self) -> bool {
        self.area.is_none() && self.project.is_none()
    }

    fn matches(&self, todo: &TaskItem) -> bool {
        let area_ok = self
            .area
            .as_deref()
            .map_or(true, |area| todo.area.as_deref() == Some(area));
        let project_ok = self
            .project
            .as_deref()
            .map_or(true, |project| todo.project.as_deref() == Some(project));
        area_ok && project_ok
    }

    pub fn apply(&self, mut todos: Vec<TaskItem>) -> Vec<TaskItem> {
        if !self.is_empty() {
            todos.retain(|todo| self.matches(todo));
        }
        todos
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::todo::Status;
    use pretty_assertions::assert_eq;

    fn todo(name: &str, area: Option<&str>, project: Option<&str>) -> TaskItem {
        let mut todo = TaskItem::new(name, Status::Completed);
        todo.area = area.map(str::to_string);
        todo.project = project.map(str::to_string);
        todo
    }

    fn names(todos: Vec<TaskItem>) -> Vec<String> {
        todos.into_iter().map(|todo| todo.name).collect()
    }

    fn sample() -> Vec<TaskItem> {
        vec![
            todo("Report", Some("Work"), Some("Q1")),
            todo("Groceries", Some("Personal"), None),
            todo("Standup", Some("Work"), None),
        ]
    }

    #[test]
    fn area_filter_keeps_matching_items_in_order() {
        let filter = ContainerFilter::new(Some("Work"), None);
        assert_eq!(names(filter.apply(sample())), vec!["Report", "Standup"]);
    }

    #[test]
    fn area_and_project_must_both_match() {
        let filter = ContainerFilter::new(Some("Work"), Some("Q1"));
        assert_eq!(names(filter.apply(sample())), vec!["Report"]);

        let filter = ContainerFilter::new(Some("Personal"), Some("Q1"));
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn empty_strings_mean_no_constraint() {
        let filter = ContainerFilter::new(Some(""), Some("  "));
        assert!(filter.is_empty());
        assert_eq!(filter.apply(sample()), sample());
    }

    #[test]
    fn matching_is_exact() {
        let filter = ContainerFilter::new(Some("work"), None);
        assert!(filter.apply(sample()).is_empty());
    }
}
