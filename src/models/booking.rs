use serde::{Deserialize, Serialize};

pub const REQUIRED_FIELDS: [&str; 5] = ["date", "time", "customer_name", "address", "phone"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub date: String,
    pub time: String,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub date: String,
    pub time: String,
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    /// Road distance from the shop in meters.
    pub distance: u64,
}

impl BookingRequest {
    /// Short area label: the second comma-separated part of the address.
    pub fn area(&self) -> &str {
        self.address.split(',').map(str::trim).nth(1).unwrap_or("")
    }

    pub fn event_summary(&self) -> String {
        format!("{} {}", self.customer_name, self.area()).trim_end().to_string()
    }

    pub fn event_description(&self) -> String {
        format!(
            "Customer: {}\nAddress: {}\nPhone: {}",
            self.customer_name, self.address, self.phone
        )
    }

    pub fn confirm(self, distance: u64) -> BookingConfirmation {
        BookingConfirmation {
            date: self.date,
            time: self.time,
            customer_name: self.customer_name,
            address: self.address,
            phone: self.phone,
            distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(address: &str) -> BookingRequest {
        BookingRequest {
            date: "2026-10-20".into(),
            time: "10:30".into(),
            customer_name: "Jane Doe".into(),
            address: address.into(),
            phone: "01442 000000".into(),
        }
    }

    #[test]
    fn area_is_second_address_segment() {
        assert_eq!(request("1 High Street, Berkhamsted, HP4 1AA").area(), "Berkhamsted");
        assert_eq!(request("HP4 1AA").area(), "");
    }

    #[test]
    fn summary_and_description_encode_customer() {
        let req = request("1 High Street, Berkhamsted, HP4 1AA");
        assert_eq!(req.event_summary(), "Jane Doe Berkhamsted");
        assert_eq!(
            req.event_description(),
            "Customer: Jane Doe\nAddress: 1 High Street, Berkhamsted, HP4 1AA\nPhone: 01442 000000"
        );
        assert_eq!(request("HP4 1AA").event_summary(), "Jane Doe");
    }
}
