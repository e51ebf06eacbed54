// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Candidate network-target extraction from shell commands.
//!
//! Recognized shapes: URLs on the known schemes, `user@host:path` scp forms,
//! bare `host:port` tokens, and the first non-option argument of a known
//! network-capable command. Everything else passes through untouched.

use crate::host::normalize_host;
use crate::netcmd::{NetCommandTable, URL_SCHEMES};

/// One place a command might reach the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetTarget {
    /// Normalized host, when one could be read out of the command. Package
    /// managers hitting their registry have none.
    pub host: Option<String>,
    /// What the denial message shows.
    pub display: String,
}

impl NetTarget {
    fn with_host(host: String, display: impl Into<String>) -> Self {
        Self { host: Some(host), display: display.into() }
    }

    fn opaque(display: impl Into<String>) -> Self {
        Self { host: None, display: display.into() }
    }
}

/// Extract every candidate network target from `command`.
pub fn extract_targets(command: &str, table: &NetCommandTable) -> Vec<NetTarget> {
    let mut targets: Vec<NetTarget> = Vec::new();
    let push = |t: NetTarget, targets: &mut Vec<NetTarget>| {
        if !targets.iter().any(|existing| existing.display == t.display) {
            targets.push(t);
        }
    };

    for tokens in split_commands(command) {
        // Token-shape scan over the whole simple command.
        for token in &tokens {
            if token.contains('=') {
                // VAR=value and --flag=value tokens stay out of the
                // host:port heuristic; URLs inside are still caught below.
                if let Some(host) = url_host(token) {
                    push(NetTarget::with_host(host, token.clone()), &mut targets);
                }
                continue;
            }
            if let Some(host) = url_host(token) {
                push(NetTarget::with_host(host, token.clone()), &mut targets);
            } else if let Some(host) = scp_host(token) {
                push(NetTarget::with_host(host, token.clone()), &mut targets);
            } else if let Some(host) = host_port(token) {
                push(NetTarget::with_host(host, token.clone()), &mut targets);
            }
        }

        // Command-aware scan.
        let Some((name, rest)) = command_name(&tokens) else { continue };
        if table.is_direct(name) {
            // Prefer an argument that parses as a URL / scp / user@host form
            // anywhere in the command (scp puts the local file first), then
            // fall back to the first non-option argument.
            let parsed = rest.iter().find_map(|a| structured_host(a).map(|h| (h, a)));
            if let Some((host, arg)) = parsed {
                push(NetTarget::with_host(host, arg.clone()), &mut targets);
            } else if let Some(arg) = first_non_option(rest) {
                match arg_host(arg) {
                    Some(host) => {
                        push(NetTarget::with_host(host, arg.clone()), &mut targets);
                    }
                    None => push(NetTarget::opaque(format!("{name} {arg}")), &mut targets),
                }
            }
        } else if name == "git" {
            if let Some(sub) = first_non_option(rest) {
                if table.git_network.contains(&sub.as_str()) {
                    let after_sub = &rest[rest
                        .iter()
                        .position(|t| t == sub)
                        .map(|i| i + 1)
                        .unwrap_or(rest.len())..];
                    match first_non_option(after_sub).and_then(|a| arg_host(a)) {
                        Some(host) => {
                            push(NetTarget::with_host(host, format!("git {sub}")), &mut targets);
                        }
                        None => push(NetTarget::opaque(format!("git {sub}")), &mut targets),
                    }
                }
            }
        } else if let Some(pm) = table.package_manager(name) {
            if let Some(sub) = first_non_option(rest) {
                if pm.is_network_subcommand(sub) {
                    push(NetTarget::opaque(format!("{name} {sub}")), &mut targets);
                }
            }
        }
    }
    targets
}

/// Split a command line into simple commands of whitespace tokens, honoring
/// quotes and splitting at unquoted `;`, `|`, and `&`.
fn split_commands(input: &str) -> Vec<Vec<String>> {
    let mut commands = Vec::new();
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut chars = input.chars().peekable();

    let flush_token = |current: &mut String, tokens: &mut Vec<String>| {
        if !current.is_empty() {
            tokens.push(std::mem::take(current));
        }
    };

    while let Some(ch) = chars.next() {
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '\\' if !in_single => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ';' | '|' | '&' if !in_single && !in_double => {
                // Consume the second char of && and ||.
                if let Some(&next) = chars.peek() {
                    if next == ch {
                        chars.next();
                    }
                }
                flush_token(&mut current, &mut tokens);
                if !tokens.is_empty() {
                    commands.push(std::mem::take(&mut tokens));
                }
            }
            c if c.is_whitespace() && !in_single && !in_double => {
                flush_token(&mut current, &mut tokens);
            }
            c => current.push(c),
        }
    }
    flush_token(&mut current, &mut tokens);
    if !tokens.is_empty() {
        commands.push(tokens);
    }
    commands
}

/// Command name (basename, env-assignment prefix skipped) and the argument
/// tokens after it.
fn command_name(tokens: &[String]) -> Option<(&str, &[String])> {
    let mut idx = 0;
    while idx < tokens.len() && is_env_assignment(&tokens[idx]) {
        idx += 1;
    }
    let raw = tokens.get(idx)?;
    let name = raw.rsplit('/').next().unwrap_or(raw);
    Some((name, &tokens[idx + 1..]))
}

fn is_env_assignment(token: &str) -> bool {
    match token.split_once('=') {
        Some((name, _)) => {
            !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    }
}

fn first_non_option(tokens: &[String]) -> Option<&String> {
    tokens.iter().find(|t| !t.starts_with('-'))
}

/// Host from a URL on a recognized scheme.
fn url_host(token: &str) -> Option<String> {
    let (scheme, rest) = token.split_once("://")?;
    if !URL_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
        return None;
    }
    let authority = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    let host = authority.rsplit('@').next().unwrap_or(authority);
    if host.is_empty() {
        return None;
    }
    Some(normalize_host(host))
}

/// Host from an scp-style `user@host:path` token.
fn scp_host(token: &str) -> Option<String> {
    let (user, rest) = token.split_once('@')?;
    let (host, _path) = rest.split_once(':')?;
    if user.is_empty() || host.is_empty() || host.contains('/') {
        return None;
    }
    Some(normalize_host(host))
}

/// Host from a bare `host:port` token. The host part needs at least one
/// letter or a dot so times and ratios don't match.
fn host_port(token: &str) -> Option<String> {
    if token.matches(':').count() != 1 || token.contains('/') {
        return None;
    }
    let (host, port) = token.split_once(':')?;
    if host.is_empty() || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hostlike = host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let anchored = host.chars().any(|c| c.is_ascii_alphabetic()) || host.contains('.');
    if hostlike && anchored {
        Some(normalize_host(host))
    } else {
        None
    }
}

/// Host from an argument in one of the unambiguous shapes: URL, scp form,
/// or `user@host`.
fn structured_host(arg: &str) -> Option<String> {
    if let Some(host) = url_host(arg) {
        return Some(host);
    }
    if let Some(host) = scp_host(arg) {
        return Some(host);
    }
    if let Some((user, host)) = arg.split_once('@') {
        if !user.is_empty() && !host.is_empty() && !host.contains('/') && !host.contains(':') {
            return Some(normalize_host(host));
        }
    }
    None
}

/// Host from the argument of a direct network command (`curl example.com/x`,
/// `ssh user@host`).
fn arg_host(arg: &str) -> Option<String> {
    if let Some(host) = structured_host(arg) {
        return Some(host);
    }
    let bare = arg.split('/').next().unwrap_or(arg);
    if bare.contains('.') || normalize_host(bare) == "localhost" {
        return Some(normalize_host(bare));
    }
    None
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
