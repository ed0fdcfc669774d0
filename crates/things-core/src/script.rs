use std::fmt;

pub const SUCCESS_TOKEN: &str = "SUCCESS";
pub const ERROR_PREFIX: &str = "ERROR:";

pub const DEFAULT_APP_NAME: &str = "Things3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// JavaScript for Automation, single-quoted string literals.
    JavaScript,
    /// AppleScript, double-quoted string literals.
    AppleScript,
}

impl Dialect {
    /// Arguments placed before `-e <script>` on the osascript command line.
    pub fn osascript_args(&self) -> &'static [&'static str] {
        match self {
            Dialect::JavaScript => &["-l", "JavaScript"],
            Dialect::AppleScript => &[],
        }
    }

    #[cfg(test)]
    fn quote(&self) -> char {
        match self {
            Dialect::JavaScript => '\'',
            Dialect::AppleScript => '"',
        }
    }

    /// Escape `value` so it can sit inside one of this dialect's string literals.
    pub fn escape(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len() + 8);
        match self {
            Dialect::JavaScript => {
                for ch in value.chars() {
                    match ch {
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\u{2028}' => out.push_str("\\u2028"),
                        '\u{2029}' => out.push_str("\\u2029"),
                        other => out.push(other),
                    }
                }
            }
            Dialect::AppleScript => {
                for ch in value.chars() {
                    match ch {
                        '\\' => out.push_str("\\\\"),
                        '"' => out.push_str("\\\""),
                        other => out.push(other),
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::JavaScript => f.write_str("JXA"),
            Dialect::AppleScript => f.write_str("AppleScript"),
        }
    }
}

/// A rendered script, ready to hand to a [`crate::bridge::ScriptRunner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub dialect: Dialect,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    /// User data; escaped for the template's dialect.
    Text(&'a str),
    /// Script source produced by another template; inserted verbatim.
    Code(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub struct Template {
    pub dialect: Dialect,
    pub text: &'static str,
}

impl Template {
    pub fn render(&self, values: &[(&str, Value<'_>)]) -> String {
        let mut out = String::with_capacity(self.text.len() + 64);
        let mut rest = self.text;
        while let Some(open) = rest.find("{{") {
            out.push_str(&rest[..open]);
            let after = &rest[open + 2..];
            let Some(close) = after.find("}}") else {
                out.push_str(&rest[open..]);
                rest = "";
                break;
            };
            let key = &after[..close];
            match values.iter().find(|(name, _)| *name == key) {
                Some((_, Value::Text(text))) => out.push_str(&self.dialect.escape(text)),
                Some((_, Value::Code(code))) => out.push_str(code),
                None => {
                    out.push_str("{{");
                    out.push_str(key);
                    out.push_str("}}");
                }
            }
            rest = &after[close + 2..];
        }
        out.push_str(rest);
        out
    }

    fn script(&self, values: &[(&str, Value<'_>)]) -> Script {
        Script {
            dialect: self.dialect,
            text: self.render(values),
        }
    }
}

pub const TODO_OBJECT_BUILDER: &str = r#"
        var item = {
            name: todo.name(),
            status: todo.status()
        };

        if (todo.notes()) item.notes = todo.notes();

        if (todo.creationDate()) item.creationDate = todo.creationDate().toISOString();
        if (todo.modificationDate()) item.modificationDate = todo.modificationDate().toISOString();
        if (todo.dueDate()) item.dueDate = todo.dueDate().toISOString();
        if (completionDate) item.completionDate = completionDate.toISOString();
        if (todo.cancellationDate()) item.cancellationDate = todo.cancellationDate().toISOString();

        // tagNames comes back as a comma separated string
        var tags = todo.tagNames();
        if (tags) {
            if (typeof tags === 'string') {
                item.tagNames = tags.split(',').map(function(t) { return t.trim(); }).filter(function(t) { return t.length > 0; });
            } else if (tags.length > 0) {
                item.tagNames = tags;
            }
        }

        if (todo.area && todo.area()) item.area = todo.area().name();
        if (todo.project && todo.project()) item.project = todo.project().name();

        result.push(item);"#;

pub const SINCE_SETUP: Template = Template {
    dialect: Dialect::JavaScript,
    text: "var filterDate = new Date('{{since}}');",
};

pub const SINCE_CHECK: &str = r#"
        if (!completionDate || completionDate < filterDate) {
            continue;
        }"#;

pub const LIST_TODOS: Template = Template {
    dialect: Dialect::JavaScript,
    text: r#"
try {
    var app = Application('{{app}}');
    var list = app.lists.byName('{{list}}');
    var todos = list.toDos();
    var result = [];
    {{since_setup}}

    for (var i = 0; i < todos.length; i++) {
        var todo = todos[i];
        var completionDate = todo.completionDate();
{{since_check}}
{{builder}}
    }
    JSON.stringify(result);
} catch (e) {
    'ERROR: List "{{list}}" not found';
}
"#,
};

pub const TODO_PROPERTIES: Template = Template {
    dialect: Dialect::JavaScript,
    text: "{name: '{{name}}'}",
};

pub const TODO_PROPERTIES_WITH_TAGS: Template = Template {
    dialect: Dialect::JavaScript,
    text: "{name: '{{name}}', tagNames: '{{tags}}'}",
};

pub const ADD_TODO: Template = Template {
    dialect: Dialect::JavaScript,
    text: r#"
try {
    var app = Application('{{app}}');
    var list = app.lists.byName('{{list}}');
    var todo = app.ToDo({{properties}});
    list.toDos.unshift(todo);
    'SUCCESS';
} catch (e) {
    'ERROR: ' + e.message;
}
"#,
};

pub const DELETE_TODO: Template = Template {
    dialect: Dialect::JavaScript,
    text: r#"
try {
    var app = Application('{{app}}');
    var list = app.lists.byName('{{list}}');
    var todos = list.toDos();
    var todoFound = false;

    for (var i = 0; i < todos.length; i++) {
        if (todos[i].name() === '{{name}}') {
            app.delete(todos[i]);
            todoFound = true;
            break;
        }
    }

    if (todoFound) {
        'SUCCESS';
    } else {
        'ERROR: To-do not found in list';
    }
} catch (e) {
    'ERROR: List not found';
}
"#,
};

pub const RENAME_TODO: Template = Template {
    dialect: Dialect::JavaScript,
    text: r#"
try {
    var app = Application('{{app}}');
    var list = app.lists.byName('{{list}}');
    var todos = list.toDos();
    var todoFound = false;

    for (var i = 0; i < todos.length; i++) {
        if (todos[i].name() === '{{name}}') {
            todos[i].name = '{{new_name}}';
            todoFound = true;
            break;
        }
    }

    if (todoFound) {
        'SUCCESS';
    } else {
        'ERROR: To-do not found in list';
    }
} catch (e) {
    'ERROR: List not found';
}
"#,
};

pub const MOVE_TODO: Template = Template {
    dialect: Dialect::AppleScript,
    text: r#"
try
    tell application "{{app}}"
        set todoItem to first to do of list "{{from}}" whose name is "{{name}}"
        move todoItem to list "{{to}}"
        return "SUCCESS"
    end tell
on error errMsg
    if errMsg contains "Can't get" then
        return "ERROR: To-do not found"
    else
        return "ERROR: " & errMsg
    end if
end try
"#,
};

pub const LOG_COMPLETED: Template = Template {
    dialect: Dialect::JavaScript,
    text: r#"
try {
    var app = Application('{{app}}');
    app.logCompletedNow();
    'SUCCESS';
} catch (e) {
    'ERROR: ' + e.message;
}
"#,
};

pub const LIST_NAMES: Template = Template {
    dialect: Dialect::JavaScript,
    text: r#"
try {
    var app = Application('{{app}}');
    JSON.stringify(app.lists.name());
} catch (e) {
    'ERROR: ' + e.message;
}
"#,
};

/// Builds the script for each operation against one target application.
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    app_name: String,
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_APP_NAME)
    }
}

impl ScriptBuilder {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// `since` is an ISO-8601 instant; when set, only to-dos completed at or
    /// after it are returned.
    pub fn list_todos(&self, list: &str, since: Option<&str>) -> Script {
        let (setup, check) = match since {
            Some(since) => (
                SINCE_SETUP.render(&[("since", Value::Text(since))]),
                SINCE_CHECK,
            ),
            None => (String::new(), ""),
        };
        LIST_TODOS.script(&[
            ("app", Value::Text(&self.app_name)),
            ("list", Value::Text(list)),
            ("since_setup", Value::Code(&setup)),
            ("since_check", Value::Code(check)),
            ("builder", Value::Code(TODO_OBJECT_BUILDER)),
        ])
    }

    pub fn add_todo(&self, list: &str, name: &str, tags: Option<&str>) -> Script {
        let properties = match tags.filter(|tags| !tags.is_empty()) {
            Some(tags) => TODO_PROPERTIES_WITH_TAGS
                .render(&[("name", Value::Text(name)), ("tags", Value::Text(tags))]),
            None => TODO_PROPERTIES.render(&[("name", Value::Text(name))]),
        };
        ADD_TODO.script(&[
            ("app", Value::Text(&self.app_name)),
            ("list", Value::Text(list)),
            ("properties", Value::Code(&properties)),
        ])
    }

    pub fn delete_todo(&self, list: &str, name: &str) -> Script {
        DELETE_TODO.script(&[
            ("app", Value::Text(&self.app_name)),
            ("list", Value::Text(list)),
            ("name", Value::Text(name)),
        ])
    }

    pub fn rename_todo(&self, list: &str, old_name: &str, new_name: &str) -> Script {
        RENAME_TODO.script(&[
            ("app", Value::Text(&self.app_name)),
            ("list", Value::Text(list)),
            ("name", Value::Text(old_name)),
            ("new_name", Value::Text(new_name)),
        ])
    }

    pub fn move_todo(&self, from: &str, to: &str, name: &str) -> Script {
        MOVE_TODO.script(&[
            ("app", Value::Text(&self.app_name)),
            ("from", Value::Text(from)),
            ("to", Value::Text(to)),
            ("name", Value::Text(name)),
        ])
    }

    pub fn log_completed(&self) -> Script {
        LOG_COMPLETED.script(&[("app", Value::Text(&self.app_name))])
    }

    pub fn list_names(&self) -> Script {
        LIST_NAMES.script(&[("app", Value::Text(&self.app_name))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// True when every `quote` in `escaped` is preceded by an odd run of backslashes.
    fn all_quotes_escaped(escaped: &str, quote: char) -> bool {
        let chars: Vec<char> = escaped.chars().collect();
        chars.iter().enumerate().all(|(idx, ch)| {
            if *ch != quote {
                return true;
            }
            let slashes = chars[..idx].iter().rev().take_while(|c| **c == '\\').count();
            slashes % 2 == 1
        })
    }

    const HOSTILE: [&str; 6] = [
        "O'Brien's \"notes\"",
        "trailing backslash \\",
        "already escaped \\'",
        "already escaped \\\"",
        "'); app.quit(); ('",
        "\" & (do shell script \"ls\") & \"",
    ];

    #[test]
    fn javascript_escape_never_ends_literal_early() {
        for input in HOSTILE {
            let escaped = Dialect::JavaScript.escape(input);
            assert!(
                all_quotes_escaped(&escaped, Dialect::JavaScript.quote()),
                "{input:?} -> {escaped:?}"
            );
            assert!(!escaped.ends_with('\\') || escaped.ends_with("\\\\"));
        }
    }

    #[test]
    fn applescript_escape_never_ends_literal_early() {
        for input in HOSTILE {
            let escaped = Dialect::AppleScript.escape(input);
            assert!(
                all_quotes_escaped(&escaped, Dialect::AppleScript.quote()),
                "{input:?} -> {escaped:?}"
            );
        }
    }

    #[test]
    fn javascript_escape_handles_line_breaks() {
        assert_eq!(Dialect::JavaScript.escape("a\nb\rc"), "a\\nb\\rc");
        assert_eq!(Dialect::AppleScript.escape("a\nb"), "a\nb");
    }

    #[test]
    fn escaping_targets_each_dialects_delimiter() {
        assert_eq!(Dialect::JavaScript.escape("it's \"x\""), "it\\'s \"x\"");
        assert_eq!(Dialect::AppleScript.escape("it's \"x\""), "it's \\\"x\\\"");
    }

    #[test]
    fn render_is_single_pass() {
        let template = Template {
            dialect: Dialect::JavaScript,
            text: "a='{{a}}'; b='{{b}}'; {{missing}}",
        };
        let out = template.render(&[("a", Value::Text("{{b}}")), ("b", Value::Text("x"))]);
        assert_eq!(out, "a='{{b}}'; b='x'; {{missing}}");
    }

    #[test]
    fn every_operation_fills_all_placeholders() {
        let builder = ScriptBuilder::default();
        let scripts = [
            builder.list_todos("Today", None),
            builder.list_todos("Logbook", Some("2024-01-15T00:00:00+00:00")),
            builder.add_todo("inbox", "Milk", None),
            builder.add_todo("inbox", "Milk", Some("Home, Errands")),
            builder.delete_todo("Today", "Milk"),
            builder.rename_todo("Today", "Milk", "Oat milk"),
            builder.move_todo("Today", "Anytime", "Milk"),
            builder.log_completed(),
            builder.list_names(),
        ];
        for script in scripts {
            assert!(!script.text.contains("{{"), "{}", script.text);
            assert!(script.text.contains("Things3"));
        }
    }

    #[test]
    fn list_script_only_filters_when_since_is_given() {
        let builder = ScriptBuilder::default();
        let plain = builder.list_todos("Work", None);
        assert_eq!(plain.dialect, Dialect::JavaScript);
        assert!(plain.text.contains("app.lists.byName('Work')"));
        assert!(!plain.text.contains("filterDate"));

        let since = builder.list_todos("Logbook", Some("2024-01-15T00:00:00+01:00"));
        assert!(since
            .text
            .contains("var filterDate = new Date('2024-01-15T00:00:00+01:00');"));
        assert!(since.text.contains("completionDate < filterDate"));
    }

    #[test]
    fn add_script_includes_tags_only_when_present() {
        let builder = ScriptBuilder::default();
        let without = builder.add_todo("inbox", "Buy milk", Some(""));
        assert!(without.text.contains("app.ToDo({name: 'Buy milk'})"));
        let with = builder.add_todo("inbox", "Buy milk", Some("Home, Errands"));
        assert!(with
            .text
            .contains("app.ToDo({name: 'Buy milk', tagNames: 'Home, Errands'})"));
    }

    #[test]
    fn javascript_templates_escape_single_quotes() {
        let builder = ScriptBuilder::default();
        let script = builder.rename_todo("Bob's list", "Call Mom's doctor", "It's done");
        assert!(script.text.contains("app.lists.byName('Bob\\'s list')"));
        assert!(script.text.contains("=== 'Call Mom\\'s doctor'"));
        assert!(script.text.contains("todos[i].name = 'It\\'s done';"));
    }

    #[test]
    fn move_uses_applescript_and_escapes_double_quotes() {
        let builder = ScriptBuilder::default();
        let script = builder.move_todo("My \"A\" list", "Bob's list", "Say \"hi\"");
        assert_eq!(script.dialect, Dialect::AppleScript);
        assert!(script
            .text
            .contains("first to do of list \"My \\\"A\\\" list\" whose name is \"Say \\\"hi\\\"\""));
        assert!(script.text.contains("move todoItem to list \"Bob's list\""));
    }

    #[test]
    fn custom_app_name_is_used() {
        let builder = ScriptBuilder::new("Things Beta");
        assert_eq!(builder.app_name(), "Things Beta");
        let script = builder.log_completed();
        assert!(script.text.contains("Application('Things Beta')"));
        assert!(script.text.contains("app.logCompletedNow();"));
    }
}
