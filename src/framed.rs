//! [`embedded_hal::i2c::I2c`] on top of a raw [`I2CBus`].

use core::fmt;

use embedded_hal::i2c::{self, ErrorKind, NoAcknowledgeSource, Operation, SevenBitAddress};

use crate::{Direction, I2CBus};

/// Failure of one framing step, carrying the bus's own error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramingError<E> {
    /// No start condition could be produced, usually a busy bus.
    Start(E),
    /// The address header was not acknowledged.
    Header(E),
    /// A data byte was not acknowledged.
    Send(E),
    Read(E),
    Stop(E),
}

impl<E: fmt::Debug> i2c::Error for FramingError<E> {
    fn kind(&self) -> ErrorKind {
        match self {
            FramingError::Start(_) => ErrorKind::Bus,
            FramingError::Header(_) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
            FramingError::Send(_) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            FramingError::Read(_) | FramingError::Stop(_) => ErrorKind::Other,
        }
    }
}

/// Adapts an [`I2CBus`] to the `embedded-hal` I2C interface.
///
/// Each run of same-direction operations in a transaction is opened with a
/// (repeated) start condition and an address header. The last byte read
/// before a direction change or the end of the transaction is NACKed, and a
/// stop condition always closes the transaction, also after a failure.
#[derive(Debug)]
pub struct FramedBus<B> {
    bus: B,
}

impl<B: I2CBus> FramedBus<B> {
    /// Initializes `bus` and wraps it.
    pub fn new(bus: B) -> Self {
        bus.init();
        Self { bus }
    }

    /// Returns the wrapped bus.
    pub fn release(self) -> B {
        self.bus
    }

    fn run(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), FramingError<B::Error>> {
        let mut current = None;
        for index in 0..operations.len() {
            let next_is_read = matches!(operations.get(index + 1), Some(Operation::Read(_)));
            let direction = match operations[index] {
                Operation::Read(_) => Direction::Read,
                Operation::Write(_) => Direction::Write,
            };

            if current != Some(direction) {
                self.bus.start_condition().map_err(FramingError::Start)?;
                self.bus
                    .send_header(address, direction)
                    .map_err(FramingError::Header)?;
                current = Some(direction);
            }

            match &mut operations[index] {
                Operation::Write(bytes) => self.bus.send(*bytes).map_err(FramingError::Send)?,
                Operation::Read(buffer) => self
                    .bus
                    .read(buffer, !next_is_read)
                    .map_err(FramingError::Read)?,
            }
        }
        Ok(())
    }
}

impl<B: I2CBus> i2c::ErrorType for FramedBus<B> {
    type Error = FramingError<B::Error>;
}

impl<B: I2CBus> i2c::I2c<SevenBitAddress> for FramedBus<B> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let result = self.run(address, operations);
        let stop = self.bus.stop_condition().map_err(FramingError::Stop);
        result.and(stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Ad5593r, Channel};
    use core::cell::RefCell;
    use embedded_hal::i2c::{Error as _, I2c};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Init,
        Start,
        Stop,
        Header(u8, Direction),
        Send(Vec<u8>),
        Read(usize, bool),
    }

    /// Records every framing step and answers reads from a canned buffer.
    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<Event>>,
        response: Vec<u8>,
        nack_address: Option<u8>,
    }

    impl Recorder {
        fn log(&self, event: Event) {
            self.events.borrow_mut().push(event);
        }
    }

    impl I2CBus for Recorder {
        type Error = &'static str;

        fn init(&self) {
            self.log(Event::Init);
        }

        fn start_condition(&self) -> Result<(), Self::Error> {
            self.log(Event::Start);
            Ok(())
        }

        fn stop_condition(&self) -> Result<(), Self::Error> {
            self.log(Event::Stop);
            Ok(())
        }

        fn send_header(&self, address: u8, direction: Direction) -> Result<(), Self::Error> {
            self.log(Event::Header(address, direction));
            if self.nack_address == Some(address) {
                return Err("address nack");
            }
            Ok(())
        }

        fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
            self.log(Event::Send(data.to_vec()));
            Ok(())
        }

        fn read(&self, data: &mut [u8], nack_last: bool) -> Result<(), Self::Error> {
            self.log(Event::Read(data.len(), nack_last));
            data.copy_from_slice(&self.response[..data.len()]);
            Ok(())
        }
    }

    #[test]
    fn write_read_uses_repeated_start() {
        let recorder = Recorder {
            response: vec![0x17, 0xE5],
            ..Default::default()
        };
        let mut bus = FramedBus::new(recorder);

        let mut buffer = [0u8; 2];
        bus.write_read(0x10, &[0x40], &mut buffer).unwrap();

        assert_eq!(buffer, [0x17, 0xE5]);
        assert_eq!(
            bus.release().events.into_inner(),
            vec![
                Event::Init,
                Event::Start,
                Event::Header(0x10, Direction::Write),
                Event::Send(vec![0x40]),
                Event::Start,
                Event::Header(0x10, Direction::Read),
                Event::Read(2, true),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn adjacent_reads_share_one_header() {
        let recorder = Recorder {
            response: vec![0xAA, 0xBB],
            ..Default::default()
        };
        let mut bus = FramedBus::new(recorder);

        let (mut first, mut second) = ([0u8; 1], [0u8; 2]);
        bus.transaction(
            0x11,
            &mut [Operation::Read(&mut first), Operation::Read(&mut second)],
        )
        .unwrap();

        let events = bus.release().events.into_inner();
        assert_eq!(
            events[1..],
            [
                Event::Start,
                Event::Header(0x11, Direction::Read),
                Event::Read(1, false),
                Event::Read(2, true),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn address_nack_still_stops_the_bus() {
        let recorder = Recorder {
            nack_address: Some(0x10),
            ..Default::default()
        };
        let mut bus = FramedBus::new(recorder);

        let error = bus.write(0x10, &[0x0B, 0x02, 0x00]).unwrap_err();
        assert_eq!(error, FramingError::Header("address nack"));
        assert_eq!(
            error.kind(),
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
        );
        assert_eq!(bus.release().events.into_inner().last(), Some(&Event::Stop));
    }

    #[test]
    fn drives_the_adapter() {
        let mut adac = Ad5593r::new(FramedBus::new(Recorder::default()));
        adac.configure_general_output(Channel::CH4).unwrap();

        let (bus, _) = adac.release();
        assert_eq!(
            bus.release().events.into_inner(),
            vec![
                Event::Init,
                Event::Start,
                Event::Header(0x10, Direction::Write),
                Event::Send(vec![0x08, 0x00, 0x10]),
                Event::Stop,
            ]
        );
    }
}
