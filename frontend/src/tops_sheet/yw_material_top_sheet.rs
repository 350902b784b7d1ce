use uuid::Uuid;
use yew::{classes, html, Component, Context, Html, NodeRef, Properties};

/// Full-screen overlay that slides content in from the top.
///
/// Visibility follows the `open` prop; the owner mounts the sheet when it
/// is needed and drops it afterwards.
pub struct YwMaterialTopSheet {
    pub id: String,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub children: Html,
    pub node_ref: NodeRef,
    #[prop_or(true)]
    pub open: bool,
}

impl Component for YwMaterialTopSheet {
    type Message = ();
    type Properties = Props;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            id: format!("id-{}", Uuid::new_v4()),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        html! {
            <div
                class={classes!("top-sheet", props.open.then_some("show"))}
                id={self.id.clone()}
                ref={props.node_ref.clone()}
            >
                { props.children.clone() }
            </div>
        }
    }
}
