//! Report rendering.
//!
//! [`ReportEngine`] walks a sequence of [`FileUnit`]s depth-first in
//! declaration order and writes one line per entity to a [`LineSink`]:
//!
//! ```text
//! === DUMP BEGIN ===
//! File: pkg.proto (pkg)
//! Generated: example.com/pkg/pkg
//!   Service: pkg.Greeter
//!     Method: SayHello (pkg.Greeter.SayHello)
//!        Input: HelloRequest (pkg.HelloRequest)
//!       Output: HelloReply (pkg.HelloReply)
//!   Message: HelloRequest (pkg.HelloRequest)
//!     Field: name (pkg.HelloRequest.name) <singular string>
//! === DUMP END ===
//! ```
//!
//! Comments are optional. Leading and detached blocks are written on their
//! own (possibly multi-line) line before the entity; trailing comments are
//! folded onto the entity's line. Scalar fields never carry their trailing
//! comment, only message-typed fields do.

use crate::classify::{TypeClassifier, WellKnownTypes};
use crate::comments::{format_detached, format_leading, format_trailing};
use crate::error::{Error, Result};
use crate::model::{CommentSet, Field, FieldType, FileUnit, Message, Method, Service};
use crate::sink::LineSink;
use tracing::{debug, trace};

/// First line of every report
pub const DUMP_BEGIN: &str = "=== DUMP BEGIN ===";

/// Last line of every report
pub const DUMP_END: &str = "=== DUMP END ===";

/// Suffix appended to well-known message type names
pub const WELL_KNOWN_SUFFIX: &str = " (wellknown)";

/// Configuration for report rendering
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Indentation string per nesting level (default: 2 spaces)
    pub indent_str: String,
    /// Include source comments
    pub show_comments: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            indent_str: "  ".to_string(),
            show_comments: true,
        }
    }
}

impl ReportConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indentation string
    pub fn indent_str(mut self, s: impl Into<String>) -> Self {
        self.indent_str = s.into();
        self
    }

    /// Sets whether to include comments
    pub fn show_comments(mut self, show: bool) -> Self {
        self.show_comments = show;
        self
    }
}

/// Renders descriptor trees into the dump format
#[derive(Debug, Clone, Default)]
pub struct ReportEngine<C = WellKnownTypes> {
    config: ReportConfig,
    classifier: C,
}

impl ReportEngine {
    /// Creates an engine with default config and the well-known classifier
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: TypeClassifier> ReportEngine<C> {
    /// Replaces the configuration
    pub fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the type classifier
    pub fn with_classifier<D: TypeClassifier>(self, classifier: D) -> ReportEngine<D> {
        ReportEngine {
            config: self.config,
            classifier,
        }
    }

    /// Renders `files` to `sink`.
    ///
    /// The end banner is written even when an earlier write failed; the
    /// first error is returned.
    pub fn render<S: LineSink + ?Sized>(&self, files: &[FileUnit], sink: &mut S) -> Result<()> {
        let mut writer = ReportWriter {
            sink,
            config: &self.config,
            classifier: &self.classifier,
        };

        writer.line(0, DUMP_BEGIN)?;
        let body = writer.write_files(files);
        let end = writer.line(0, DUMP_END);
        body.and(end)
    }

    /// Renders `files` into a string, one `\n`-terminated line per write
    pub fn render_to_string(&self, files: &[FileUnit]) -> String {
        let mut sink = crate::sink::MemorySink::new();
        self.render(files, &mut sink)
            .expect("MemorySink writes cannot fail");
        sink.contents()
    }
}

/// Renders `files` with default settings and the well-known classifier
pub fn render<S: LineSink + ?Sized>(
    files: &[FileUnit],
    show_comments: bool,
    sink: &mut S,
) -> Result<()> {
    ReportEngine::new()
        .with_config(ReportConfig::new().show_comments(show_comments))
        .render(files, sink)
}

struct ReportWriter<'a, S: ?Sized, C> {
    sink: &'a mut S,
    config: &'a ReportConfig,
    classifier: &'a C,
}

impl<S: LineSink + ?Sized, C: TypeClassifier> ReportWriter<'_, S, C> {
    fn line(&mut self, depth: usize, text: &str) -> Result<()> {
        let line = if depth == 0 {
            text.to_string()
        } else {
            format!("{}{}", self.config.indent_str.repeat(depth), text)
        };
        self.sink.write_line(&line).map_err(Error::Sink)
    }

    /// Writes `text`, followed by the folded trailing comment when shown
    fn line_with_trailing(&mut self, depth: usize, text: &str, comments: &CommentSet) -> Result<()> {
        match self.trailing(comments) {
            Some(trailing) => self.line(depth, &format!("{} {}", text, trailing)),
            None => self.line(depth, text),
        }
    }

    fn trailing(&self, comments: &CommentSet) -> Option<String> {
        if !self.config.show_comments {
            return None;
        }
        format_trailing(&comments.trailing)
    }

    fn leading_comments(&mut self, depth: usize, comments: &CommentSet) -> Result<()> {
        if !self.config.show_comments {
            return Ok(());
        }
        if let Some(detached) = format_detached(&comments.leading_detached) {
            self.line(depth, &detached)?;
        }
        if let Some(leading) = format_leading(&comments.leading) {
            self.line(depth, &leading)?;
        }
        Ok(())
    }

    fn write_files(&mut self, files: &[FileUnit]) -> Result<()> {
        for file in files {
            if !file.generate {
                debug!("Skipping {} (not requested for generation)", file.path);
                continue;
            }
            self.write_file(file)?;
        }
        Ok(())
    }

    fn write_file(&mut self, file: &FileUnit) -> Result<()> {
        debug!(
            "Dumping {} ({} services, {} messages)",
            file.path,
            file.services.len(),
            file.messages.len()
        );

        self.line(0, &format!("File: {} ({})", file.path, file.package))?;
        self.line(0, &format!("Generated: {}", file.generated_prefix))?;

        for service in &file.services {
            self.write_service(1, service)?;
        }

        for message in &file.messages {
            self.write_message(1, message)?;
        }

        Ok(())
    }

    fn write_service(&mut self, depth: usize, service: &Service) -> Result<()> {
        trace!("Service {}", service.full_name);
        self.leading_comments(depth, &service.comments)?;
        self.line_with_trailing(
            depth,
            &format!("Service: {}", service.full_name),
            &service.comments,
        )?;

        for method in &service.methods {
            self.write_method(depth + 1, method)?;
        }

        Ok(())
    }

    fn write_method(&mut self, depth: usize, method: &Method) -> Result<()> {
        self.leading_comments(depth, &method.comments)?;
        self.line_with_trailing(
            depth,
            &format!("Method: {} ({})", method.name, method.full_name),
            &method.comments,
        )?;

        let (input, output) = (&method.input, &method.output);
        self.line(depth + 1, &format!(" Input: {} ({})", input.name, input.full_name))?;
        self.line(depth + 1, &format!("Output: {} ({})", output.name, output.full_name))
    }

    fn write_message(&mut self, depth: usize, message: &Message) -> Result<()> {
        trace!("Message {} at depth {}", message.full_name, depth);
        self.leading_comments(depth, &message.comments)?;
        self.line_with_trailing(
            depth,
            &format!("Message: {} ({})", message.name, message.full_name),
            &message.comments,
        )?;

        for field in &message.fields {
            self.write_field(depth + 1, field)?;
        }

        for nested in &message.messages {
            self.write_message(depth + 1, nested)?;
        }

        Ok(())
    }

    fn write_field(&mut self, depth: usize, field: &Field) -> Result<()> {
        self.leading_comments(depth, &field.comments)?;

        match &field.ty {
            FieldType::Message(target) => {
                let mut type_name = target.full_name.clone();
                if self.classifier.is_well_known(&target.full_name) {
                    type_name.push_str(WELL_KNOWN_SUFFIX);
                }
                self.line_with_trailing(
                    depth,
                    &format!(
                        "Field: {} ({}) <{} {}>",
                        field.name, field.full_name, field.cardinality, type_name
                    ),
                    &field.comments,
                )?;

                if let Some(map) = &target.map {
                    self.line(
                        depth + 1,
                        &format!("Map <{}> → {} <{}>", map.key, map.value_full_name, map.value),
                    )?;
                }
            }
            // Trailing comments are not attached to scalar fields.
            FieldType::Scalar(kind) => {
                self.line(
                    depth,
                    &format!(
                        "Field: {} ({}) <{} {}>",
                        field.name, field.full_name, field.cardinality, kind
                    ),
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cardinality, Kind, MapEntry, MessageRef, MessageType};
    use crate::sink::MemorySink;
    use pretty_assertions::assert_eq;
    use std::io;

    fn scalar(message: &str, name: &str, cardinality: Cardinality, kind: Kind) -> Field {
        Field {
            name: name.to_string(),
            full_name: format!("{}.{}", message, name),
            comments: CommentSet::default(),
            cardinality,
            ty: FieldType::Scalar(kind),
        }
    }

    fn message_field(message: &str, name: &str, cardinality: Cardinality, target: &str) -> Field {
        Field {
            name: name.to_string(),
            full_name: format!("{}.{}", message, name),
            comments: CommentSet::default(),
            cardinality,
            ty: FieldType::Message(MessageType::new(target)),
        }
    }

    fn message(full_name: &str, fields: Vec<Field>, messages: Vec<Message>) -> Message {
        Message {
            name: MessageRef::from_full_name(full_name).name,
            full_name: full_name.to_string(),
            comments: CommentSet::default(),
            fields,
            messages,
        }
    }

    fn greeter_file() -> FileUnit {
        FileUnit {
            path: "pkg.proto".into(),
            package: "pkg".into(),
            generate: true,
            generated_prefix: "example.com/pkg/pkg".into(),
            services: vec![Service {
                full_name: "pkg.Greeter".into(),
                comments: CommentSet::leading(" The greeting service.\n")
                    .with_trailing(" svc tail\n")
                    .with_detached(" Copyright.\n"),
                methods: vec![Method {
                    name: "SayHello".into(),
                    full_name: "pkg.Greeter.SayHello".into(),
                    comments: CommentSet::leading(" Sends a greeting.\n")
                        .with_trailing(" first\n second\n"),
                    input: MessageRef::from_full_name("pkg.HelloRequest"),
                    output: MessageRef::from_full_name("pkg.HelloReply"),
                }],
            }],
            messages: vec![message(
                "pkg.HelloRequest",
                vec![scalar(
                    "pkg.HelloRequest",
                    "name",
                    Cardinality::Singular,
                    Kind::String,
                )],
                vec![],
            )],
        }
    }

    fn render_lines(files: &[FileUnit], show_comments: bool) -> Vec<String> {
        let mut sink = MemorySink::new();
        render(files, show_comments, &mut sink).unwrap();
        sink.lines().to_vec()
    }

    #[test]
    fn test_greeter_without_comments() {
        let lines = render_lines(&[greeter_file()], false);
        assert_eq!(
            lines,
            vec![
                "=== DUMP BEGIN ===",
                "File: pkg.proto (pkg)",
                "Generated: example.com/pkg/pkg",
                "  Service: pkg.Greeter",
                "    Method: SayHello (pkg.Greeter.SayHello)",
                "       Input: HelloRequest (pkg.HelloRequest)",
                "      Output: HelloReply (pkg.HelloReply)",
                "  Message: HelloRequest (pkg.HelloRequest)",
                "    Field: name (pkg.HelloRequest.name) <singular string>",
                "=== DUMP END ===",
            ]
        );
    }

    #[test]
    fn test_greeter_with_comments() {
        let lines = render_lines(&[greeter_file()], true);
        assert_eq!(
            lines,
            vec![
                "=== DUMP BEGIN ===",
                "File: pkg.proto (pkg)",
                "Generated: example.com/pkg/pkg",
                "  //! Copyright.",
                "  // The greeting service.",
                "  Service: pkg.Greeter  svc tail",
                "    // Sends a greeting.",
                "    Method: SayHello (pkg.Greeter.SayHello)  first| second",
                "       Input: HelloRequest (pkg.HelloRequest)",
                "      Output: HelloReply (pkg.HelloReply)",
                "  Message: HelloRequest (pkg.HelloRequest)",
                "    Field: name (pkg.HelloRequest.name) <singular string>",
                "=== DUMP END ===",
            ]
        );
    }

    #[test]
    fn test_comment_gating() {
        let mut file = greeter_file();
        file.messages[0].comments = CommentSet::leading(" SECRET lead\n")
            .with_trailing(" SECRET tail\n")
            .with_detached(" SECRET detached\n");
        file.messages[0].fields[0].comments = CommentSet::leading(" SECRET field\n");

        let hidden = render_lines(&[file.clone()], false);
        assert!(hidden.iter().all(|l| !l.contains("SECRET") && !l.contains("//")));

        let shown = render_lines(&[file], true);
        assert!(shown.iter().any(|l| l.contains("SECRET")));
    }

    #[test]
    fn test_skip_rule() {
        let mut skipped = greeter_file();
        skipped.generate = false;
        skipped.path = "dep.proto".into();

        let lines = render_lines(&[skipped.clone()], true);
        assert_eq!(lines, vec![DUMP_BEGIN, DUMP_END]);

        let both = render_lines(&[skipped, greeter_file()], true);
        assert!(both.iter().all(|l| !l.contains("dep.proto")));
        assert_eq!(both, render_lines(&[greeter_file()], true));
    }

    #[test]
    fn test_nesting_indentation() {
        let inner = message(
            "pkg.A.B.C",
            vec![scalar("pkg.A.B.C", "deep", Cardinality::Repeated, Kind::Int64)],
            vec![],
        );
        let middle = message(
            "pkg.A.B",
            vec![scalar("pkg.A.B", "mid", Cardinality::Optional, Kind::Bool)],
            vec![inner],
        );
        let outer = message("pkg.A", vec![], vec![middle]);
        let file = FileUnit {
            path: "a.proto".into(),
            package: "pkg".into(),
            generate: true,
            generated_prefix: "a".into(),
            messages: vec![outer],
            ..FileUnit::default()
        };

        let lines = render_lines(&[file], false);
        assert_eq!(
            lines[3..7],
            [
                "  Message: A (pkg.A)",
                "    Message: B (pkg.A.B)",
                "      Field: mid (pkg.A.B.mid) <optional bool>",
                "      Message: C (pkg.A.B.C)",
            ]
        );
        assert_eq!(lines[7], "        Field: deep (pkg.A.B.C.deep) <repeated int64>");
    }

    #[test]
    fn test_fields_render_before_nested_messages() {
        let nested = message("pkg.M.N", vec![], vec![]);
        let m = message(
            "pkg.M",
            vec![message_field("pkg.M", "n", Cardinality::Singular, "pkg.M.N")],
            vec![nested],
        );
        let file = FileUnit {
            path: "m.proto".into(),
            package: "pkg".into(),
            generate: true,
            generated_prefix: "m".into(),
            messages: vec![m],
            ..FileUnit::default()
        };
        let lines = render_lines(&[file], false);
        assert_eq!(lines[4], "    Field: n (pkg.M.n) <singular pkg.M.N>");
        assert_eq!(lines[5], "    Message: N (pkg.M.N)");
    }

    #[test]
    fn test_map_field() {
        let mut labels = message_field("pkg.M", "labels", Cardinality::Repeated, "pkg.M.LabelsEntry");
        labels.ty = FieldType::Message(MessageType {
            full_name: "pkg.M.LabelsEntry".into(),
            map: Some(MapEntry {
                key: Kind::String,
                value_full_name: "pkg.M.LabelsEntry.value".into(),
                value: Kind::Message,
            }),
        });
        let entry = message(
            "pkg.M.LabelsEntry",
            vec![
                scalar("pkg.M.LabelsEntry", "key", Cardinality::Optional, Kind::String),
                message_field("pkg.M.LabelsEntry", "value", Cardinality::Optional, "pkg.V"),
            ],
            vec![],
        );
        let file = FileUnit {
            path: "m.proto".into(),
            package: "pkg".into(),
            generate: true,
            generated_prefix: "m".into(),
            messages: vec![message("pkg.M", vec![labels], vec![entry])],
            ..FileUnit::default()
        };

        let lines = render_lines(&[file], true);
        assert_eq!(
            lines[3..9],
            [
                "  Message: M (pkg.M)",
                "    Field: labels (pkg.M.labels) <repeated pkg.M.LabelsEntry>",
                "      Map <string> → pkg.M.LabelsEntry.value <message>",
                "    Message: LabelsEntry (pkg.M.LabelsEntry)",
                "      Field: key (pkg.M.LabelsEntry.key) <optional string>",
                "      Field: value (pkg.M.LabelsEntry.value) <optional pkg.V>",
            ]
        );
        assert_eq!(lines.iter().filter(|l| l.contains("Map <")).count(), 1);
    }

    #[test]
    fn test_well_known_tagging() {
        let m = message(
            "pkg.Event",
            vec![
                message_field("pkg.Event", "at", Cardinality::Singular, "google.protobuf.Timestamp"),
                message_field("pkg.Event", "payload", Cardinality::Singular, "pkg.Payload"),
            ],
            vec![],
        );
        let file = FileUnit {
            path: "e.proto".into(),
            package: "pkg".into(),
            generate: true,
            generated_prefix: "e".into(),
            messages: vec![m],
            ..FileUnit::default()
        };

        let lines = render_lines(&[file.clone()], false);
        assert_eq!(
            lines[4],
            "    Field: at (pkg.Event.at) <singular google.protobuf.Timestamp (wellknown)>"
        );
        assert_eq!(lines[5], "    Field: payload (pkg.Event.payload) <singular pkg.Payload>");

        let everything = ReportEngine::new().with_classifier(|_: &str| true);
        let out = everything.render_to_string(&[file]);
        assert!(out.contains("<singular pkg.Payload (wellknown)>"));
    }

    #[test]
    fn test_trailing_comment_asymmetry() {
        let mut text = scalar("pkg.M", "text", Cardinality::Singular, Kind::String);
        text.comments = CommentSet::leading(" text doc\n").with_trailing(" text tail\n");
        let mut child = message_field("pkg.M", "child", Cardinality::Singular, "pkg.C");
        child.comments = CommentSet::default().with_trailing(" child tail\n");

        let file = FileUnit {
            path: "m.proto".into(),
            package: "pkg".into(),
            generate: true,
            generated_prefix: "m".into(),
            messages: vec![message("pkg.M", vec![text, child], vec![])],
            ..FileUnit::default()
        };

        let lines = render_lines(&[file], true);
        assert_eq!(
            lines[3..7],
            [
                "  Message: M (pkg.M)",
                "    // text doc",
                "    Field: text (pkg.M.text) <singular string>",
                "    Field: child (pkg.M.child) <singular pkg.C>  child tail",
            ]
        );
    }

    #[test]
    fn test_multiline_leading_comment_is_single_write() {
        let mut file = greeter_file();
        file.services.clear();
        file.messages[0].comments = CommentSet::leading(" line one\n line two\n");

        let lines = render_lines(&[file], true);
        assert_eq!(lines[3], "  // line one\n// line two");
        assert_eq!(lines[4], "  Message: HelloRequest (pkg.HelloRequest)");
    }

    #[test]
    fn test_deterministic_and_read_only() {
        let files = vec![greeter_file()];
        let snapshot = files.clone();
        let engine = ReportEngine::new();
        let first = engine.render_to_string(&files);
        let second = engine.render_to_string(&files);
        assert_eq!(first, second);
        assert_eq!(files, snapshot);
    }

    #[test]
    fn test_custom_indent() {
        let engine =
            ReportEngine::new().with_config(ReportConfig::new().indent_str("\t").show_comments(false));
        let out = engine.render_to_string(&[greeter_file()]);
        assert!(out.contains("\n\tService: pkg.Greeter\n"));
        assert!(out.contains("\n\t\t\t Input: HelloRequest (pkg.HelloRequest)\n"));
    }

    /// Fails every write whose line contains `needle`
    struct FailingSink {
        needle: &'static str,
        lines: Vec<String>,
    }

    impl LineSink for FailingSink {
        fn write_line(&mut self, line: &str) -> io::Result<()> {
            if line.contains(self.needle) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
            }
            self.lines.push(line.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_end_banner_after_sink_failure() {
        let mut sink = FailingSink {
            needle: "Message:",
            lines: Vec::new(),
        };
        let err = render(&[greeter_file()], false, &mut sink).unwrap_err();
        assert!(err.is_sink_error());
        assert_eq!(sink.lines.first().map(String::as_str), Some(DUMP_BEGIN));
        assert_eq!(sink.lines.last().map(String::as_str), Some(DUMP_END));
        assert!(sink.lines.iter().all(|l| !l.contains("Field:")));
    }
}
