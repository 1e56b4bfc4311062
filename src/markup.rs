//! Script and stylesheet element rendering.
//!
//! Turns a descriptor into a `<script>` or `<link>` string using the values
//! from [`crate::synth`]. HTML output uses bare boolean attributes; XML output
//! writes `name="name"` and self-closes the element.

use crate::resource::{
    ResourceDescriptor, ResourceKind, ScriptAttributes, ScriptType, StyleAttributes,
};
use crate::synth::{self, AttributeSet, Notice, SrcRefusal};

/// Rendering switches.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Emit self-closing XML style markup.
    pub xml: bool,
    /// Content-Security-Policy nonce, written as given.
    pub nonce: Option<String>,
    /// Path prefix for locally served resources.
    pub prefix: Option<String>,
}

/// Rendered markup plus notices from synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub markup: String,
    pub notices: Vec<Notice>,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("resource refused: {0}")]
    Refused(#[from] SrcRefusal),

    #[error("plain file resources have no markup representation")]
    NotEmbeddable,
}

/// Render the element matching the descriptor's kind.
pub fn render(
    descriptor: &ResourceDescriptor,
    options: &RenderOptions,
) -> Result<Rendered, RenderError> {
    match descriptor.kind() {
        ResourceKind::Script(script) => render_script(descriptor, script, options),
        ResourceKind::Stylesheet(style) => render_stylesheet(descriptor, style, options),
        ResourceKind::File => Err(RenderError::NotEmbeddable),
    }
}

fn render_script(
    descriptor: &ResourceDescriptor,
    script: &ScriptAttributes,
    options: &RenderOptions,
) -> Result<Rendered, RenderError> {
    let attrs = synth::synthesize(descriptor, options.prefix.as_deref())?;
    let mut el = Element::new("script", options.xml);

    if script.script_type == ScriptType::Module {
        el.attr("type", ScriptType::Module.as_str());
    }
    el.attr("src", &attrs.src);
    common_attributes(&mut el, &attrs);
    el.flag("async", script.is_async);
    el.flag("defer", script.is_deferred);
    el.flag("nomodule", script.is_no_module);
    nonce(&mut el, options);

    let markup = if options.xml {
        el.self_closing()
    } else {
        el.with_end_tag()
    };
    Ok(Rendered {
        markup,
        notices: attrs.notices,
    })
}

fn render_stylesheet(
    descriptor: &ResourceDescriptor,
    style: &StyleAttributes,
    options: &RenderOptions,
) -> Result<Rendered, RenderError> {
    let attrs = synth::synthesize(descriptor, options.prefix.as_deref())?;
    let mut el = Element::new("link", options.xml);

    el.attr("rel", "stylesheet");
    el.attr("type", descriptor.effective_mime());
    el.attr("href", &attrs.src);
    common_attributes(&mut el, &attrs);
    if let Some(media) = style.media.as_deref() {
        el.attr("media", media);
    }
    nonce(&mut el, options);

    let markup = if options.xml {
        el.self_closing()
    } else {
        el.void()
    };
    Ok(Rendered {
        markup,
        notices: attrs.notices,
    })
}

fn common_attributes(el: &mut Element, attrs: &AttributeSet) {
    if let Some(integrity) = attrs.integrity.as_deref() {
        el.attr("integrity", integrity);
    }
    if let Some(crossorigin) = attrs.crossorigin.as_deref() {
        el.attr("crossorigin", crossorigin);
    }
}

fn nonce(el: &mut Element, options: &RenderOptions) {
    if let Some(nonce) = options.nonce.as_deref() {
        el.attr("nonce", nonce);
    }
}

struct Element {
    name: &'static str,
    xml: bool,
    out: String,
}

impl Element {
    fn new(name: &'static str, xml: bool) -> Self {
        Self {
            name,
            xml,
            out: format!("<{}", name),
        }
    }

    fn attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.out.push_str(&escape(value));
        self.out.push('"');
    }

    fn flag(&mut self, name: &str, on: bool) {
        if !on {
            return;
        }
        if self.xml {
            self.attr(name, name);
        } else {
            self.out.push(' ');
            self.out.push_str(name);
        }
    }

    fn with_end_tag(self) -> String {
        format!("{}></{}>", self.out, self.name)
    }

    fn void(self) -> String {
        format!("{}>", self.out)
    }

    fn self_closing(self) -> String {
        format!("{}/>", self.out)
    }
}

/// Escape a value for a double-quoted attribute.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
