/// Markup for a new diagram: a process with a single start event
pub const EMPTY_DIAGRAM: &str = include_str!("../assets/empty.bpmn");

/// A read-only example workflow offered in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub content: &'static str,
}

pub const EXAMPLES: &[ExampleTemplate] = &[
    ExampleTemplate {
        name: "Employee Onboarding",
        description: "HR setup, parallel IT provisioning & training, manager review",
        content: include_str!("../assets/examples/employee_onboarding.bpmn"),
    },
    ExampleTemplate {
        name: "Purchase Order Approval",
        description: "Submit PO, manager review, conditional VP approval for large orders",
        content: include_str!("../assets/examples/purchase_order.bpmn"),
    },
    ExampleTemplate {
        name: "Customer Support Ticket",
        description: "Triage by severity into L1/L2/L3 support paths, resolution & confirmation",
        content: include_str!("../assets/examples/customer_support.bpmn"),
    },
    ExampleTemplate {
        name: "Invoice Processing",
        description: "Validate invoice, match PO, resolve discrepancies, process payment",
        content: include_str!("../assets/examples/invoice_processing.bpmn"),
    },
    ExampleTemplate {
        name: "Leave Request Approval",
        description: "Manager review, HR approval for extended leave, calendar update & notify",
        content: include_str!("../assets/examples/leave_request.bpmn"),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_diagram_shape() {
        assert!(EMPTY_DIAGRAM.starts_with("<?xml version=\"1.0\""));
        assert!(EMPTY_DIAGRAM.contains("xmlns:bpmn2=\"http://www.omg.org/spec/BPMN/20100524/MODEL\""));
        assert!(EMPTY_DIAGRAM.contains("xmlns:bpmndi=\"http://www.omg.org/spec/BPMN/20100524/DI\""));
        assert!(EMPTY_DIAGRAM.contains("id=\"Process_1\""));
        assert!(EMPTY_DIAGRAM.contains("id=\"StartEvent_1\""));
        assert!(EMPTY_DIAGRAM.contains("bpmnElement=\"Process_1\""));
        assert!(EMPTY_DIAGRAM.contains("<dc:Bounds"));
        assert!(EMPTY_DIAGRAM.contains("targetNamespace="));
    }

    #[test]
    fn test_examples_are_well_formed() {
        assert_eq!(EXAMPLES.len(), 5);
        for example in EXAMPLES {
            assert!(
                roxmltree::Document::parse(example.content).is_ok(),
                "{} is not well-formed",
                example.name
            );
            assert!(!example.description.is_empty());
        }
    }
}
