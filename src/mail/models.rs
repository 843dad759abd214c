/// A low-supply notification ready to be rendered into a mail message.
#[derive(Debug, Clone, PartialEq)]
pub struct LowSupplyAlert {
    pub printer_name: String,
    pub remaining: i32,
    pub initial: i32,
    pub percent: f64,
}

impl LowSupplyAlert {
    pub fn subject(&self) -> String {
        format!(
            "Low media alert: {} has {} prints left",
            self.printer_name, self.remaining
        )
    }

    pub fn body(&self) -> String {
        format!(
            "Printer: {}\n\
             Remaining prints: {}\n\
             Roll capacity: {}\n\
             Remaining percent: {:.1}%\n\
             \n\
             Replace the media roll soon.\n",
            self.printer_name, self.remaining, self.initial, self.percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::LowSupplyAlert;

    fn alert() -> LowSupplyAlert {
        LowSupplyAlert {
            printer_name: "DS620".to_string(),
            remaining: 29,
            initial: 300,
            percent: 29.0 * 100.0 / 300.0,
        }
    }

    #[test]
    fn subject_names_the_printer_and_count() {
        let subject = alert().subject();
        assert!(subject.contains("DS620"));
        assert!(subject.contains("29"));
    }

    #[test]
    fn body_carries_the_literal_counters() {
        let body = alert().body();
        assert!(body.contains("DS620"));
        assert!(body.contains("Remaining prints: 29"));
        assert!(body.contains("Roll capacity: 300"));
        assert!(body.contains("9.7%"));
    }
}
