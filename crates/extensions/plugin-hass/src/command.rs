//! Human-readable names for crontab commands.

/// Name a job's command for display.
///
/// Jobs are normally wrapped, e.g. `cron2mqtt exec <id> [flags] [--] <cmd>`;
/// only `<cmd>` is interesting, so everything up to the job id, flags and a
/// `--` separator are stripped. Falls back to the whole command line when
/// it cannot be picked apart, and to `id` when there is no command at all.
pub fn command_name(id: &str, command: Option<&str>) -> String {
    let Some(command) = command else {
        return id.to_string();
    };
    let Some(args) = shlex::split(command) else {
        return command.to_string();
    };

    let mut inner: Option<Vec<&str>> = None;
    for (i, arg) in args.iter().enumerate() {
        if arg == "--" {
            inner = Some(args[i + 1..].iter().map(String::as_str).collect());
            break;
        }
        if arg == id && i < args.len() - 1 {
            inner = Some(Vec::new());
            continue;
        }
        match inner.as_mut() {
            Some(inner) if !arg.starts_with('-') => inner.push(arg),
            _ => {}
        }
    }

    if let Some(inner) = inner.filter(|inner| !inner.is_empty()) {
        if let Some(split) = shlex::split(&inner.join(" ")) {
            return split.join(" ");
        }
    }
    args.join(" ")
}
