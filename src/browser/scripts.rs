use anyhow::Result;

use crate::dom::Mutation;
use crate::marker::selectors::selector_list;
use crate::marker::{INDEX_ATTRIBUTE, INTERACTIVE_SELECTORS};

/// Attribute carried by every overlay node painted into the page
pub const OVERLAY_ATTRIBUTE: &str = "data-page-marker-overlay";

/// JavaScript function capturing the elements matching `selector` (minus our
/// own overlays) with the layout and style facts the marker needs.
///
/// Each element's parent is its nearest captured ancestor and its text is a
/// single `textContent` run. Elements are registered in
/// `window.__pageMarkerNodes` so mutations can later address them by
/// capture index.
const SNAPSHOT_FUNCTION: &str = r#"
((selector) => {
    const OVERLAY_ATTR = 'data-page-marker-overlay';

    const elements = Array.from(document.querySelectorAll(selector))
        .filter(el => !el.closest(`[${OVERLAY_ATTR}]`));

    const indexOf = new Map();
    elements.forEach((el, i) => indexOf.set(el, i));

    const nearestCaptured = (el) => {
        for (let p = el.parentElement; p; p = p.parentElement) {
            if (indexOf.has(p)) return indexOf.get(p);
        }
        return null;
    };

    const nodes = elements.map((el) => {
        const rect = el.getBoundingClientRect();
        const style = window.getComputedStyle(el);

        return {
            tag: el.tagName,
            parent: nearestCaptured(el),
            attributes: Array.from(el.attributes).map(a => [a.name, a.value]),
            content: [{ text: el.textContent || '' }],
            rect: {
                left: rect.left,
                top: rect.top,
                width: rect.width,
                height: rect.height,
                x: rect.x,
                y: rect.y
            },
            offsetWidth: el.offsetWidth || 0,
            offsetHeight: el.offsetHeight || 0,
            display: style.display,
            visibility: style.visibility,
            opacity: style.opacity
        };
    });

    window.__pageMarkerNodes = elements;

    return {
        viewport: {
            clientWidth: document.documentElement.clientWidth || 0,
            clientHeight: document.documentElement.clientHeight || 0,
            innerWidth: window.innerWidth || 0,
            innerHeight: window.innerHeight || 0
        },
        styles: Array.from(document.querySelectorAll('style[data-page-marker-style]')).map(s => s.id),
        nodes: nodes
    };
})
"#;

/// CSS selector for everything a marking pass reads: catalog matches, plus
/// elements still stamped by an earlier pass so their stamps can be stripped
pub fn capture_selector() -> String {
    format!("{}, [{}]", selector_list(INTERACTIVE_SELECTORS), INDEX_ATTRIBUTE)
}

/// Build the script that captures the page
pub fn snapshot_script() -> Result<String> {
    let selector = serde_json::to_string(&capture_selector())?;
    Ok(format!("{}({})", SNAPSHOT_FUNCTION.trim(), selector))
}

/// JavaScript function replaying a mutation journal; returns how many
/// mutations found their target
const APPLY_FUNCTION: &str = r#"
((journal) => {
    const OVERLAY_ATTR = 'data-page-marker-overlay';
    const nodes = window.__pageMarkerNodes || [];
    let applied = 0;

    for (const m of journal) {
        switch (m.op) {
            case 'setAttribute': {
                const el = nodes[m.node];
                if (el) { el.setAttribute(m.name, m.value); applied++; }
                break;
            }
            case 'removeAttribute': {
                const el = nodes[m.node];
                if (el) { el.removeAttribute(m.name); applied++; }
                break;
            }
            case 'appendOverlay': {
                const mark = document.createElement('div');
                mark.setAttribute(OVERLAY_ATTR, m.id);
                for (const [name, value] of m.spec.containerStyle) {
                    mark.style.setProperty(name, value);
                }

                const label = document.createElement('div');
                label.textContent = m.spec.labelText;
                for (const [name, value] of m.spec.labelStyle) {
                    label.style.setProperty(name, value);
                }

                mark.appendChild(label);
                document.body.appendChild(mark);
                applied++;
                break;
            }
            case 'removeOverlay': {
                document.querySelectorAll(`[${OVERLAY_ATTR}="${m.id}"]`).forEach(el => {
                    el.remove();
                    applied++;
                });
                break;
            }
            case 'removeAllOverlays': {
                document.querySelectorAll(`[${OVERLAY_ATTR}]`).forEach(el => {
                    el.remove();
                    applied++;
                });
                break;
            }
            case 'injectStyle': {
                if (!document.getElementById(m.id)) {
                    const style = document.createElement('style');
                    style.id = m.id;
                    style.setAttribute('data-page-marker-style', '');
                    style.textContent = m.css;
                    document.head.append(style);
                    applied++;
                }
                break;
            }
        }
    }

    return applied;
})
"#;

/// Build the script that replays `journal` in the page
pub fn apply_script(journal: &[Mutation]) -> Result<String> {
    let payload = serde_json::to_string(journal)?;
    Ok(format!("{}({})", APPLY_FUNCTION.trim(), payload))
}

/// JavaScript reporting whether the document finished loading
pub const READY_STATE_SCRIPT: &str = "document.readyState";
